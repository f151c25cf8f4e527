use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "snapfade", version)]
struct Cli {
    /// Store root; images live in `<store>/images`, aliases in `<store>/aliases.json`.
    #[arg(long, global = true, default_value = "snapfade-data")]
    store: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a file under a name, replacing any previous content.
    Put(PutArgs),
    /// Write a stored image to a file.
    Get(GetArgs),
    /// Delete a stored image.
    Rm(NameArg),
    /// List stored images with their sizes.
    Ls,
    /// Manage aliases (static links).
    #[command(subcommand)]
    Alias(AliasCommand),
    /// Show what a request name resolves to.
    Resolve(NameArg),
    /// Flatten a scene and store it as a static image.
    Render(RenderArgs),
    /// Export a scene or stored image as a single-play vanishing GIF.
    Gif(GifArgs),
}

#[derive(Subcommand, Debug)]
enum AliasCommand {
    /// Create an alias, optionally already pointing at an image.
    Create(AliasArgs),
    /// Repoint an alias; without `--target` it points nowhere.
    Set(AliasArgs),
    /// Delete an alias.
    Rm(NameArg),
    /// List aliases.
    Ls,
}

#[derive(Args, Debug)]
struct NameArg {
    /// Image name or alias slug.
    name: String,
}

#[derive(Args, Debug)]
struct PutArgs {
    /// Name to store under.
    name: String,

    /// File to read.
    file: PathBuf,

    /// Content type; sniffed from the bytes when omitted.
    #[arg(long)]
    mime: Option<String>,
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Stored image name.
    name: String,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct AliasArgs {
    /// Alias slug.
    slug: String,

    /// Stored image the alias points at.
    #[arg(long)]
    target: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Name to store the result under.
    #[arg(long)]
    out_name: String,

    /// Output scale relative to the canvas.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Existing alias to point at the result.
    #[arg(long)]
    alias: Option<String>,
}

#[derive(Args, Debug)]
struct GifArgs {
    /// Scene JSON.
    #[arg(long, conflicts_with = "image", required_unless_present = "image")]
    scene: Option<PathBuf>,

    /// Stored image to animate instead of a scene.
    #[arg(long)]
    image: Option<String>,

    /// Name to store the GIF under.
    #[arg(long)]
    out_name: String,

    /// How long the image stays visible.
    #[arg(long)]
    seconds: f64,

    /// Output scale relative to the canvas.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Existing alias to point at the result.
    #[arg(long)]
    alias: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatChoice> for snapfade::OutputFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Png => snapfade::OutputFormat::Png,
            FormatChoice::Jpeg => snapfade::OutputFormat::Jpeg,
            FormatChoice::Webp => snapfade::OutputFormat::Webp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (images, aliases) = snapfade::open_fs_stores(&cli.store)
        .with_context(|| format!("open store '{}'", cli.store.display()))?;
    match cli.cmd {
        Command::Put(args) => cmd_put(&images, args),
        Command::Get(args) => cmd_get(&images, args),
        Command::Rm(args) => {
            if !images.delete(&args.name)? {
                anyhow::bail!("no image named '{}'", args.name);
            }
            eprintln!("deleted {}", args.name);
            Ok(())
        }
        Command::Ls => {
            for entry in images.list()? {
                println!("{}\t{}", entry.name, entry.size);
            }
            Ok(())
        }
        Command::Alias(cmd) => cmd_alias(&aliases, cmd),
        Command::Resolve(args) => cmd_resolve(images, aliases, &args.name),
        Command::Render(args) => cmd_render(images, aliases, args),
        Command::Gif(args) => cmd_gif(images, aliases, args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_put(images: &snapfade::ContentStore, args: PutArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("read '{}'", args.file.display()))?;
    let mime = match args.mime {
        Some(m) => m,
        None => snapfade::sniff_mime(&bytes).map(str::to_string).with_context(|| {
            format!("cannot tell the type of '{}'; pass --mime", args.file.display())
        })?,
    };
    images.put(&args.name, &mime, &bytes)?;
    eprintln!("stored {} ({mime}, {} bytes)", args.name, bytes.len());
    Ok(())
}

fn cmd_get(images: &snapfade::ContentStore, args: GetArgs) -> anyhow::Result<()> {
    let stored = images.get(&args.name)?;
    write_output(&args.out, &stored.bytes)?;
    eprintln!("wrote {} ({})", args.out.display(), stored.mime);
    Ok(())
}

fn cmd_alias(aliases: &snapfade::AliasTable, cmd: AliasCommand) -> anyhow::Result<()> {
    match cmd {
        AliasCommand::Create(args) => {
            aliases.create(&args.slug, args.target.as_deref())?;
            eprintln!("created alias {}", args.slug);
        }
        AliasCommand::Set(args) => {
            aliases.retarget(&args.slug, args.target.as_deref())?;
            eprintln!("updated alias {}", args.slug);
        }
        AliasCommand::Rm(args) => {
            if !aliases.delete(&args.name)? {
                anyhow::bail!("no alias named '{}'", args.name);
            }
            eprintln!("deleted alias {}", args.name);
        }
        AliasCommand::Ls => {
            for alias in aliases.list()? {
                println!("{}\t{}", alias.slug, alias.target.as_deref().unwrap_or("-"));
            }
        }
    }
    Ok(())
}

fn cmd_resolve(
    images: snapfade::ContentStore,
    aliases: snapfade::AliasTable,
    name: &str,
) -> anyhow::Result<()> {
    let resolver = snapfade::Resolver::new(images, aliases);
    match resolver.resolve(name)? {
        snapfade::Resolution::Reserved(route) => println!("reserved\t/{}", route.as_str()),
        snapfade::Resolution::Image(img) => {
            let kind = match &img.via_alias {
                Some(slug) => format!("alias:{slug}"),
                None => "image".to_string(),
            };
            println!(
                "{kind}\t{}\t{}\t{}\t{}",
                img.name,
                img.mime,
                img.bytes.len(),
                img.cache.cache_control()
            );
        }
        snapfade::Resolution::NotFound => anyhow::bail!("'{name}' resolves to nothing"),
    }
    Ok(())
}

fn load_scene(
    path: &Path,
    images: &snapfade::ContentStore,
    codec: &dyn snapfade::ImageCodec,
) -> anyhow::Result<snapfade::Scene> {
    let def = snapfade::SceneDef::from_path(path)?;
    Ok(def.build(images, codec)?)
}

fn cmd_render(
    images: snapfade::ContentStore,
    aliases: snapfade::AliasTable,
    args: RenderArgs,
) -> anyhow::Result<()> {
    let codec = snapfade::ImageRsCodec::new();
    let scene = load_scene(&args.scene, &images, &codec)?;
    let exporter = snapfade::Exporter::with_default_codec(images, aliases);

    let req = snapfade::StaticExportRequest {
        output_name: args.out_name,
        format: args.format.into(),
        quality: args.quality,
        output_scale: args.scale,
        alias: args.alias,
    };
    report(exporter.export_static(snapfade::ExportSource::Scene(&scene), &req))
}

fn cmd_gif(
    images: snapfade::ContentStore,
    aliases: snapfade::AliasTable,
    args: GifArgs,
) -> anyhow::Result<()> {
    let codec = snapfade::ImageRsCodec::new();
    let scene = match &args.scene {
        Some(path) => Some(load_scene(path, &images, &codec)?),
        None => None,
    };
    let exporter = snapfade::Exporter::with_default_codec(images, aliases);

    let source = match (&scene, &args.image) {
        (Some(scene), _) => snapfade::ExportSource::Scene(scene),
        (None, Some(name)) => snapfade::ExportSource::Image(name),
        (None, None) => anyhow::bail!("pass --scene or --image"),
    };
    let req = snapfade::GifExportRequest {
        output_name: args.out_name,
        show_duration_secs: args.seconds,
        output_scale: args.scale,
        alias: args.alias,
    };
    report(exporter.export_single_play(source, &req))
}

fn report(result: snapfade::SnapfadeResult<snapfade::ExportOutcome>) -> anyhow::Result<()> {
    let response = snapfade::ExportResponse::from_result(&result);
    println!(
        "{}",
        serde_json::to_string(&response).context("serialize export response")?
    );
    result?;
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
