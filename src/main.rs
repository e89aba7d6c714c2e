use std::{error::Error, fmt, path::Path};

use facet::Facet;
use figue as args;
use indicatif::ProgressStyle;
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use placard::{
    PlacardConfig,
    color::Rgb,
    font::{OutlineFont, list_fonts, resolve_font},
    fullwidth::Fullwidth,
    layout::{LettersPerPage, PageGeometry},
    page_size::{Orientation, PageSize, pt_from_mm},
    renderer::{
        Canvas, WritingMode,
        pdf::PdfCanvas,
        svg::{SvgCanvas, write_page},
    },
};
use tracing::{info, info_span, warn};
use tracing_indicatif::{IndicatifLayer, span_ext::IndicatifSpanExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Searched when no `--font-dir` is given.
const DEFAULT_FONT_DIRS: [&str; 4] = [
    "/usr/share/fonts/**/*.ttf",
    "/usr/share/fonts/**/*.otf",
    "/usr/share/fonts/**/*.ttc",
    "/usr/local/share/fonts/**/*.ttf",
];

#[derive(Facet)]
struct Cli {
    /// Text to typeset. `\n`, `\t`, `\r`, `\f` and `\\` escapes are decoded.
    #[facet(args::named, default = "This is\na test.")]
    text: String,

    /// Output file. A `.svg` name writes one SVG per page (`NAME-1.svg`,
    /// `NAME-2.svg`, ...); anything else writes a single PDF.
    #[facet(args::named, args::short = 'o', default = "output.pdf")]
    out: String,

    /// Page size name (A4, B5, Letter, ...) or `WIDTHxHEIGHT` in millimetres.
    #[facet(args::named, default = "A4")]
    page_size: String,

    /// Use landscape orientation (the default).
    #[facet(args::named, default = false)]
    landscape: bool,

    /// Use portrait orientation.
    #[facet(args::named, default = false)]
    portrait: bool,

    /// Font file path or family name. Defaults to the first face found.
    #[facet(args::named)]
    font: Option<String>,

    /// Glob pattern of font files to search for families (can be repeated).
    #[facet(args::named)]
    font_dir: Vec<String>,

    /// Font file used for the error page when the main font lacks coverage.
    #[facet(args::named)]
    fallback_font: Option<String>,

    /// Margin in millimetres, around the page and between rows.
    #[facet(args::named, default = 8.0)]
    margin: f64,

    #[facet(args::named, default = "black")]
    text_color: String,

    #[facet(args::named, default = "white")]
    back_color: String,

    /// Largest width/height ratio of a stretched character (1.0 or more).
    #[facet(args::named, default = 1.5)]
    threshold: f64,

    /// Characters per page with whitespace removed, or -1 for no limit.
    #[facet(args::named, default = -1)]
    letters_per_page: i64,

    /// Write top to bottom in columns, right to left.
    #[facet(args::named, default = false)]
    vertical: bool,

    /// Move the baseline up by this many millimetres.
    #[facet(args::named, default = 0.0)]
    y_adjust: f64,

    /// List the font families found and exit.
    #[facet(args::named, default = false)]
    font_list: bool,
}

impl Cli {
    fn font_dirs(&self) -> Vec<String> {
        if self.font_dir.is_empty() {
            DEFAULT_FONT_DIRS.iter().map(|dir| dir.to_string()).collect()
        } else {
            self.font_dir.clone()
        }
    }

    fn config(&self) -> Result<PlacardConfig> {
        let orientation = orientation(self.landscape, self.portrait)?;

        let size = PageSize::parse(&self.page_size)
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to parse --page-size: {}", self.page_size))?
            .oriented(orientation);

        let text_color: Rgb = self
            .text_color
            .parse()
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to parse --text-color: {}", self.text_color))?;
        let back_color: Rgb = self
            .back_color
            .parse()
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to parse --back-color: {}", self.back_color))?;

        let config = PlacardConfig {
            page: PageGeometry {
                width: pt_from_mm(size.width),
                height: pt_from_mm(size.height),
                margin: pt_from_mm(self.margin),
            },
            mode: if self.vertical {
                WritingMode::Vertical
            } else {
                WritingMode::Horizontal
            },
            text_color,
            back_color,
            threshold: self.threshold,
            y_adjust: -pt_from_mm(self.y_adjust),
            letters_per_page: LettersPerPage::from_count(self.letters_per_page)
                .map_err(LibError)
                .into_diagnostic()
                .wrap_err_with(|| miette!("Failed to parse --letters-per-page"))?,
            ..PlacardConfig::default()
        };

        config
            .validate()
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Invalid settings"))?;

        Ok(config)
    }
}

fn orientation(landscape: bool, portrait: bool) -> Result<Orientation> {
    match (landscape, portrait) {
        (true, true) => Err(miette!("--landscape and --portrait are mutually exclusive")),
        (_, true) => Ok(Orientation::Portrait),
        _ => Ok(Orientation::Landscape),
    }
}

/// An error from the library, with its cause chain exposed to miette.
#[derive(Debug)]
struct LibError(anyhow::Error);

impl fmt::Display for LibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for LibError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Output backend, picked by the extension of `-o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Pdf,
    Svg,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Pdf,
        }
    }
}

fn typeset<C: Canvas>(
    cli: &Cli,
    config: &PlacardConfig,
    primary: &OutlineFont,
    fallback: &OutlineFont,
    canvas: &mut C,
) {
    let report = placard::render(config, &cli.text, primary, fallback, &Fullwidth, canvas);

    if let Some(script) = report.substituted {
        warn!(
            "{:?} does not cover {script:?} text; wrote an error page instead",
            primary.family()
        );
    }

    if report.skipped_rows() > 0 {
        warn!("{} rows could not be fitted", report.skipped_rows());
    }
}

fn write_svg_pages(pages: &[String], out: &Path) -> Result<()> {
    let pages_span = info_span!("write_pages");
    pages_span.pb_set_style(
        &ProgressStyle::with_template(
            "{msg} [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise}]",
        )
        .into_diagnostic()?,
    );
    pages_span.pb_set_length(pages.len() as u64);
    pages_span.pb_set_message("Writing pages");

    let pages_span_enter = pages_span.enter();

    for (index, page) in pages.iter().enumerate() {
        pages_span.pb_inc(1);

        let path = write_page(page, out, index, pages.len())
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to write page {}", index + 1))?;

        info!("Wrote {:?}", path);
    }

    drop(pages_span_enter);
    drop(pages_span);

    Ok(())
}

fn main() -> Result<()> {
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();

    let cli: Cli = args::from_std_args().into_result().into_diagnostic()?.get();
    let font_dirs = cli.font_dirs();

    if cli.font_list {
        let mut families: Vec<String> = list_fonts(&font_dirs)
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to list fonts in {font_dirs:?}"))?
            .into_iter()
            .map(|entry| entry.family)
            .filter(|family| !family.is_empty())
            .collect();
        families.dedup();

        for family in families {
            println!("{family}");
        }

        return Ok(());
    }

    let config = cli.config()?;

    let primary = match &cli.font {
        Some(name) => resolve_font(name, &font_dirs)
            .map_err(LibError)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to load --font: {name}"))?,
        None => {
            let entry = list_fonts(&font_dirs)
                .map_err(LibError)
                .into_diagnostic()
                .wrap_err_with(|| miette!("Failed to list fonts in {font_dirs:?}"))?
                .into_iter()
                .next()
                .ok_or_else(|| miette!("No fonts found in {font_dirs:?}; pass --font"))?;

            OutlineFont::load(&entry.path, entry.index)
                .map_err(LibError)
                .into_diagnostic()
                .wrap_err_with(|| miette!("Failed to load font file: {:?}", entry.path))?
        }
    };

    let fallback = match &cli.fallback_font {
        Some(name) => Some(
            resolve_font(name, &font_dirs)
                .map_err(LibError)
                .into_diagnostic()
                .wrap_err_with(|| miette!("Failed to load --fallback-font: {name}"))?,
        ),
        None => None,
    };
    let fallback = fallback.as_ref().unwrap_or(&primary);

    info!(
        "Typesetting with {:?} on {:.1} x {:.1} pt pages...",
        primary.family(),
        config.page.width,
        config.page.height
    );

    let out = Path::new(&cli.out);
    let (width, height) = (config.page.width, config.page.height);

    match OutputFormat::from_path(out) {
        OutputFormat::Pdf => {
            let mut canvas = PdfCanvas::new(width, height, &primary, fallback);
            typeset(&cli, &config, &primary, fallback, &mut canvas);

            let count = canvas
                .save(out)
                .map_err(LibError)
                .into_diagnostic()
                .wrap_err_with(|| miette!("Failed to write PDF output"))?;

            info!("Wrote {count} pages to {:?}", out);
        }
        OutputFormat::Svg => {
            let mut canvas = SvgCanvas::new(width, height, &primary, fallback);
            typeset(&cli, &config, &primary, fallback, &mut canvas);

            write_svg_pages(&canvas.finish(), out)?;
        }
    }

    info!("Done.");

    Ok(())
}
