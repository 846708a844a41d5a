use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use isoview::{
    frame_to_svg, timed, CameraState, Frame, GridPoint, GroundType, HitResult,
    HitStats, HitTester, IsometricProjector, Point2, ProjectionCache, TileGrid,
    ViewConfig, ViewportWindow,
};
use log::{info, LevelFilter};
use serde::Serialize;
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
    str::FromStr,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for inspecting isometric projections, paint order and pointer hit
/// tests on a generated tile grid.
#[derive(Debug, StructOpt)]
#[structopt(name = "isoview")]
struct Opt {
    /// Path to a config file that defines projection constants, camera
    /// limits, viewport size and cache capacities. Supported formats: JSON,
    /// TOML. Any missing fields use their defaults
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Number of tiles along each side of the (square) backing grid
    #[structopt(long, default_value = "64")]
    grid_size: u32,

    /// Height of every tile in the backing grid, before spikes are applied
    #[structopt(long, default_value = "0")]
    base_height: u16,

    /// Ground type of every tile in the backing grid. Options: fire, water,
    /// earth, wind
    #[structopt(long, default_value = "earth")]
    ground: GroundType,

    /// Raise a single backing grid tile to a height, as `x,y,height`. Can be
    /// given multiple times
    #[structopt(long = "spike")]
    spikes: Vec<Spike>,

    /// Move the viewport window so its top-left tile is at this backing grid
    /// position, as `x,y`. By default the window is centered on the grid
    #[structopt(long, parse(try_from_str = parse_grid_point))]
    window: Option<GridPoint>,

    /// Camera rotation, in degrees
    #[structopt(long, default_value = "0")]
    rotation: f64,

    /// Camera zoom factor
    #[structopt(long, default_value = "1")]
    zoom: f64,

    /// Screen-space camera pan, as `x,y`
    #[structopt(long, parse(try_from_str = parse_point))]
    pan: Option<Point2>,

    /// Screen point that the center of the window projects onto, as `x,y`
    #[structopt(long, parse(try_from_str = parse_point))]
    anchor: Option<Point2>,

    /// Run a hit test at this screen point, as `x,y`. Can be given multiple
    /// times
    #[structopt(long = "pointer", parse(try_from_str = parse_point))]
    pointers: Vec<Point2>,

    /// If given, output files will be saved to this directory. The exact
    /// files that appear in the directory are defined by the output formats.
    /// See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the frame in. Supported formats:
    ///
    /// cfg - The full config object used for the frame, in TOML format
    ///
    /// hits - Result of every `--pointer` hit test, in JSON format
    ///
    /// json - JSON representation of the projected, ordered frame
    ///
    /// svg - 2D rendering of the frame
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// Export the full config in a human-readable file
    Cfg,
    /// Export the hit test results for every pointer
    Hits,
    /// Export the projected frame as JSON
    Json,
    /// Render the frame as a 2D SVG
    Svg,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Cfg => "toml",
            Self::Hits => "json",
            Self::Json => "json",
            Self::Svg => "svg",
        }
    }
}

/// A single raised tile: `x,y,height`
#[derive(Copy, Clone, Debug)]
struct Spike {
    point: GridPoint,
    height: u16,
}

impl FromStr for Spike {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split(',').collect::<Vec<_>>().as_slice() {
            [x, y, height] => Ok(Self {
                point: GridPoint::new(x.trim().parse()?, y.trim().parse()?),
                height: height.trim().parse()?,
            }),
            _ => bail!("expected x,y,height but got {:?}", s),
        }
    }
}

fn parse_pair<T: FromStr>(s: &str) -> anyhow::Result<(T, T)>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match s.split_once(',') {
        Some((x, y)) => Ok((x.trim().parse()?, y.trim().parse()?)),
        None => bail!("expected x,y but got {:?}", s),
    }
}

fn parse_point(s: &str) -> anyhow::Result<Point2> {
    let (x, y) = parse_pair(s)?;
    Ok(Point2::new(x, y))
}

fn parse_grid_point(s: &str) -> anyhow::Result<GridPoint> {
    let (x, y) = parse_pair(s)?;
    Ok(GridPoint::new(x, y))
}

/// Everything the hit tester found, for the `hits` output format
#[derive(Debug, Serialize)]
struct HitReport {
    origin: GridPoint,
    camera: CameraState,
    pointers: Vec<PointerHit>,
    stats: HitStats,
}

#[derive(Debug, Serialize)]
struct PointerHit {
    pointer: Point2,
    hit: Option<HitResult>,
}

fn load_config(config_path: &Path) -> anyhow::Result<ViewConfig> {
    // Load config
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Generate an output form of the frame in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    config: &ViewConfig,
    frame: &Frame,
    hit_report: &HitReport,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        config: &ViewConfig,
        frame: &Frame,
        hit_report: &HitReport,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(match output_format {
            OutputFormat::Cfg => toml::to_string_pretty(config)
                .context("error serializing config")?
                .into_bytes(),
            OutputFormat::Hits => serde_json::to_vec_pretty(hit_report)?,
            OutputFormat::Json => frame.to_json()?.into_bytes(),
            OutputFormat::Svg => frame_to_svg(frame).to_string().into_bytes(),
        })
    }

    let file_name = match output_format {
        OutputFormat::Hits => "hits",
        _ => "frame",
    };
    let output_file_path =
        output_dir.join(file_name).with_extension(output_format.file_ext());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes =
                generate_bytes(output_format, config, frame, hit_report)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => ViewConfig::default(),
    };
    let projector = IsometricProjector::new(config)?;

    // Build the backing grid
    let mut grid = TileGrid::uniform(
        opt.grid_size,
        opt.grid_size,
        opt.base_height,
        opt.ground,
    );
    for spike in &opt.spikes {
        grid.get_mut(spike.point)
            .ok_or_else(|| anyhow!("spike {} is outside the grid", spike.point))?
            .height = spike.height;
    }

    let mut window = ViewportWindow::new(grid, config.viewport)?;
    if let Some(position) = opt.window {
        window.set_position(position.x, position.y);
    }
    let slice = window.current_slice();
    info!(
        "Viewport at {} ({} tiles, tallest {})",
        slice.origin(),
        slice.tiles().count(),
        slice.max_height()
    );

    let mut camera = CameraState::builder().rotation(opt.rotation).zoom(opt.zoom);
    if let Some(pan) = opt.pan {
        camera = camera.pan(pan);
    }
    if let Some(anchor) = opt.anchor {
        camera = camera.anchor(anchor);
    }
    let camera = camera.build().context("invalid camera")?;

    let mut cache =
        ProjectionCache::new(config.projection.projection_cache_capacity);
    let frame = Frame::build(&projector, &camera, &slice, &mut cache);

    println!("Paint order:");
    for frame_tile in &frame.tiles {
        println!(
            "  {} height={} depth={:.3} anchor={}",
            frame_tile.backing,
            frame_tile.tile.height,
            frame_tile.depth,
            frame_tile.anchor
        );
    }

    let mut hit_tester = HitTester::new(config.hit);
    let mut pointers = Vec::with_capacity(opt.pointers.len());
    for pointer in &opt.pointers {
        let hit = hit_tester.hit_test(&projector, &camera, &slice, *pointer);
        match &hit {
            Some(hit) => println!(
                "Pointer {} -> {} (local {}, height {}, {:.2}px from center)",
                pointer,
                hit.backing,
                hit.point,
                hit.height,
                hit.distance_from_center
            ),
            None => println!("Pointer {} -> nothing", pointer),
        }
        pointers.push(PointerHit {
            pointer: *pointer,
            hit,
        });
    }
    let hit_report = HitReport {
        origin: slice.origin(),
        camera,
        pointers,
        stats: hit_tester.stats(),
    };

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = &opt.output {
        if opt.output_formats.is_empty() {
            bail!("output dir was specified, but no output formats were given")
        }
        fs::create_dir_all(output_dir)?;

        for output_format in &opt.output_formats {
            gen_output(
                output_dir,
                *output_format,
                &config,
                &frame,
                &hit_report,
            )?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
