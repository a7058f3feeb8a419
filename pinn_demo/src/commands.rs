use std::{fs::File, io::Write, path::Path};

use anyhow::Context;
use pricing_model::{
    MarketParams, ModelSet, PricingNet, Variant, loader,
    surface::{self, GridAxis},
};
use serde::Serialize;

use crate::{
    cli::{Command, PriceArgs, SurfaceArgs},
    config::DemoConfig,
};

/// Runs one command, writing its report to `out`.
pub fn run<W: Write>(config: &DemoConfig, command: Command, out: &mut W) -> anyhow::Result<()> {
    let mut models = config.model_set();

    match command {
        Command::Price(args) => price(config, &mut models, args, out),
        Command::Surface(args) => price_surface(config, &mut models, args, out),
        Command::Inspect { file } => inspect(&file, out),
        Command::Init { model, output } => init(model, &output, out),
    }
}

fn price<W: Write>(
    config: &DemoConfig,
    models: &mut ModelSet,
    args: PriceArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let variant = args.model.unwrap_or(config.default_model);
    let params = MarketParams {
        spot: config.spot.resolve("spot", args.spot)?,
        maturity: config.maturity.resolve("maturity", args.maturity)?,
        volatility: volatility(config, variant, args.volatility)?,
    };

    let input = variant.input_vector(&params)?;
    log::info!("pricing with the {variant} model, input {input:?}");

    let net = models
        .get(variant)
        .with_context(|| format!("the {variant} model is unavailable"))?;
    let price = pricing_model::evaluate(net, &input)?;

    writeln!(out, "Option Price = ${price:.4}")?;
    Ok(())
}

#[derive(Serialize)]
struct SurfaceRow {
    spot: f32,
    maturity: f32,
    price: f32,
}

fn price_surface<W: Write>(
    config: &DemoConfig,
    models: &mut ModelSet,
    args: SurfaceArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let variant = args.model.unwrap_or(config.default_model);
    let points = args.points.unwrap_or(config.surface_points);
    anyhow::ensure!(points >= 2, "a surface needs at least 2 points per axis");

    let volatility = volatility(config, variant, args.volatility)?;
    let net = models
        .get(variant)
        .with_context(|| format!("the {variant} model is unavailable"))?;

    let grid = surface::surface(
        net,
        GridAxis::new(config.spot.min, config.spot.max, points),
        GridAxis::new(config.maturity.min, config.maturity.max, points),
        volatility,
    )?;
    log::info!("priced a {points}×{points} {variant} surface");

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create '{}'", path.display()))?;
            write_surface(&grid, file)?;
            writeln!(out, "Wrote {} prices to '{}'", grid.prices.len(), path.display())?;
        }
        None => write_surface(&grid, out)?,
    }

    Ok(())
}

fn write_surface<W: Write>(grid: &surface::Surface, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (spot, maturity, price) in grid.points() {
        writer.serialize(SurfaceRow {
            spot,
            maturity,
            price,
        })?;
    }

    writer.flush()?;
    Ok(())
}

fn inspect<W: Write>(file: &Path, out: &mut W) -> anyhow::Result<()> {
    let inspection = loader::inspect(file)?;

    for tensor in &inspection.tensors {
        writeln!(out, "{:<16} {:<5} {:?}", tensor.name, tensor.dtype, tensor.shape)?;
    }

    if inspection.compatible.is_empty() {
        writeln!(out, "compatible with: none")?;
    } else {
        let names: Vec<_> = inspection.compatible.iter().map(|v| v.name()).collect();
        writeln!(out, "compatible with: {}", names.join(", "))?;
    }

    Ok(())
}

fn init<W: Write>(variant: Variant, output: &Path, out: &mut W) -> anyhow::Result<()> {
    let net = PricingNet::new(variant);
    pricing_model::save(&net, output)
        .with_context(|| format!("cannot write '{}'", output.display()))?;

    writeln!(
        out,
        "Wrote an all-zero {variant} model ({} parameters) to '{}'",
        net.num_params(),
        output.display()
    )?;
    Ok(())
}

/// Resolves the volatility input, which only the Heston model reads.
fn volatility(
    config: &DemoConfig,
    variant: Variant,
    given: Option<f32>,
) -> anyhow::Result<Option<f32>> {
    match variant {
        Variant::Heston => Ok(Some(config.volatility.resolve("volatility", given)?)),
        Variant::BlackScholes => {
            if given.is_some() {
                log::warn!("the {variant} model takes no volatility, ignoring it");
            }
            Ok(None)
        }
    }
}
