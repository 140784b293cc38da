use pdfcrop::{
    Aspect, AspectTarget, CropError, CropPipeline, CropPlan, CropStrategy, Cropper, Margin,
};
use tracing::info;

use crate::cli::{AspectArgs, CropArgs, OutputFormat, SourceArgs};
use crate::shared::{fail, format_rect, open_document, page_selector};

pub fn run(args: &CropArgs) -> Result<(), i32> {
    // Configuration errors are reported before the input is read.
    let cropper = build_cropper(args).map_err(fail)?;

    let mut doc = open_document(&args.file)?;
    let plan = if args.dry_run {
        cropper.plan(&doc).map_err(fail)?
    } else {
        let plan = cropper.apply(&mut doc).map_err(fail)?;
        if let Some(output) = &args.output {
            doc.save(output).map_err(fail)?;
            info!(output = %output.display(), "saved");
        }
        plan
    };

    print_plan(&plan, args.format)
}

/// Translate command-line options into a configured [`Cropper`].
pub fn build_cropper(args: &CropArgs) -> Result<Cropper, CropError> {
    let mut strategy = source_strategy(&args.source)?;
    if let Some(even) = &args.even_margin {
        let even: Margin = even.parse()?;
        strategy = CropStrategy::alternate(strategy, CropStrategy::Margin(even));
    }
    if args.flip {
        strategy = strategy.with_flip();
    }

    let pipeline = CropPipeline::new(strategy)
        .with_padding(args.padding)?
        .with_aspect(aspect_target(&args.aspect)?);
    Ok(Cropper::new(pipeline).with_selector(page_selector(&args.pages)?))
}

fn source_strategy(source: &SourceArgs) -> Result<CropStrategy, CropError> {
    Ok(if source.bbox {
        CropStrategy::BoundingBox
    } else if source.text_bbox {
        CropStrategy::TextBoundingBox
    } else if source.raster_bbox {
        CropStrategy::RasterBoundingBox
    } else {
        let margin = match &source.margin {
            Some(literal) => literal.parse()?,
            None => Margin::default(),
        };
        CropStrategy::Margin(margin)
    })
}

fn aspect_target(args: &AspectArgs) -> Result<Option<AspectTarget>, CropError> {
    if args.preserve_aspect {
        return Ok(Some(AspectTarget::PreserveMedia));
    }
    args.aspect
        .as_deref()
        .map(|literal| literal.parse::<Aspect>().map(AspectTarget::Ratio))
        .transpose()
}

fn print_plan(plan: &CropPlan, format: OutputFormat) -> Result<(), i32> {
    match format {
        OutputFormat::Text => {
            for crop in plan.iter() {
                println!(
                    "page {}: media {} crop {}",
                    crop.page,
                    format_rect(&crop.media_box),
                    format_rect(&crop.crop_box)
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(plan).map_err(fail)?;
            println!("{json}");
        }
    }
    Ok(())
}
