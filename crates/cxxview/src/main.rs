use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use cxxview_core::formatters::{FormatterRegistry, SummaryOptions, SyntheticFrontEnd};
use cxxview_core::host::{ProcessRef, TypeRef, ValueRef};
use cxxview_core::layout::{libstdcpp, scalar_display, MemoryContext, TypeLayout};
use cxxview_core::memory::{architecture_of_image, MemorySnapshot, ReadRecorder};
use cxxview_core::types::{Address, ArchitectureProfile, ByteOrder};
use cxxview_core::FormatterError;
use cxxview_utils::{init_logging_with, LogLevel, Settings};
use tracing::{debug, info};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Inspect libstdc++ strings and iterators in memory dumps and live processes.
#[derive(Parser, Debug)]
#[command(name = "cxxview")]
#[command(version)]
#[command(about = "Inspect libstdc++ strings and iterators in memory dumps and live processes", long_about = None)]
struct Cli
{
    #[command(flatten)]
    source: SourceArgs,

    /// Log level (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Maximum number of characters shown in a string summary
    #[arg(long)]
    max_len: Option<usize>,

    /// Never truncate string summaries
    #[arg(long, default_value_t = false)]
    no_capping: bool,

    /// Print every memory read to stderr when done
    #[arg(long, default_value_t = false)]
    trace_reads: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where target memory comes from
#[derive(Args, Debug)]
struct SourceArgs
{
    /// Raw memory dump to read from
    #[arg(long, conflicts_with = "pid", requires = "base")]
    dump: Option<PathBuf>,

    /// Address the first byte of the dump was captured from (hex: 0x1000 or decimal)
    #[arg(long, value_parser = parse_address)]
    base: Option<u64>,

    /// Running process to read from (Linux only)
    #[arg(long)]
    pid: Option<u32>,

    /// Executable the dump belongs to; its header decides the target architecture
    #[arg(long, conflicts_with = "pid")]
    exe: Option<PathBuf>,

    /// Target pointer size in bytes (4 or 8)
    #[arg(long, default_value_t = 8)]
    pointer_size: u8,

    /// Target wchar_t width in bits (0 if unknown)
    #[arg(long, default_value_t = 32)]
    wchar_bits: u32,

    /// Target is big endian
    #[arg(long, default_value_t = false)]
    big_endian: bool,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Summarize the std::string at ADDRESS
    String
    {
        /// Address of the string object (hex: 0x1000 or decimal)
        #[arg(value_parser = parse_address)]
        address: u64,
    },
    /// Summarize the std::wstring at ADDRESS
    Wstring
    {
        /// Address of the string object (hex: 0x1000 or decimal)
        #[arg(value_parser = parse_address)]
        address: u64,
    },
    /// Show the pair a std::map / std::set iterator points to
    MapIter
    {
        /// Address of the iterator (hex: 0x1000 or decimal)
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Key type (int, unsigned long, double, ptr, ...)
        #[arg(long)]
        key: String,
        /// Mapped type (int, unsigned long, double, ptr, ...)
        #[arg(long)]
        value: String,
    },
    /// Show the element a std::vector iterator points to
    VectorIter
    {
        /// Address of the iterator (hex: 0x1000 or decimal)
        #[arg(value_parser = parse_address)]
        address: u64,
        /// Element type (int, unsigned long, double, ptr, ...)
        #[arg(long)]
        element: String,
    },
}

fn main()
{
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let _guard = match init_logging_with(cli.log_level, settings.log_format, settings.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &settings) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli, settings: &Settings) -> CliResult<()>
{
    let source = open_source(&cli.source)?;
    let recorder = cli.trace_reads.then(|| Rc::new(ReadRecorder::new(source.clone())));
    let process: ProcessRef = match &recorder {
        Some(recorder) => recorder.clone(),
        None => source,
    };

    let arch = process.architecture();
    info!(%arch, "target memory ready");

    let registry = FormatterRegistry::libstdcpp();
    let options = summary_options(cli, settings);
    let context = MemoryContext::new(process);

    let result = match &cli.command {
        Commands::String { address } => {
            let value = context.value("string", Rc::new(libstdcpp::string(&arch)), Address::new(*address));
            print_summary(&registry, &value, &options)
        }
        Commands::Wstring { address } => {
            let value = context.value("wstring", Rc::new(libstdcpp::wstring(&arch)), Address::new(*address));
            print_summary(&registry, &value, &options)
        }
        Commands::MapIter { address, key, value } => {
            let pair = Rc::new(TypeLayout::pair(&scalar_type(key, &arch)?, &scalar_type(value, &arch)?));
            let iterator: TypeRef = Rc::new(libstdcpp::rb_tree_iterator(pair, &arch));
            print_children(&registry, &context.value("iterator", iterator, Address::new(*address)))
        }
        Commands::VectorIter { address, element } => {
            let iterator: TypeRef = Rc::new(libstdcpp::normal_iterator(scalar_type(element, &arch)?, &arch));
            print_children(&registry, &context.value("iterator", iterator, Address::new(*address)))
        }
    };

    if let Some(recorder) = recorder {
        for read in recorder.reads() {
            let status = if read.ok { "ok" } else { "failed" };
            eprintln!("read {:>6} bytes at {} ({status})", read.len, read.address);
        }
    }
    result
}

fn open_source(args: &SourceArgs) -> CliResult<ProcessRef>
{
    if let Some(pid) = args.pid {
        return open_process(pid);
    }

    let Some(dump) = &args.dump else {
        return Err("either --dump or --pid is required".into());
    };
    let base = args.base.ok_or("--dump requires --base")?;
    let arch = target_profile(args)?;
    debug!(dump = %dump.display(), base, %arch, "opening memory dump");

    Ok(Rc::new(MemorySnapshot::from_dump_file(dump, Address::new(base), arch)?))
}

#[cfg(target_os = "linux")]
fn open_process(pid: u32) -> CliResult<ProcessRef>
{
    info!("Reading memory of process {}", pid);
    Ok(Rc::new(cxxview_core::memory::ProcMemory::open(pid)?))
}

#[cfg(not(target_os = "linux"))]
fn open_process(_pid: u32) -> CliResult<ProcessRef>
{
    Err("--pid is only supported on Linux".into())
}

fn target_profile(args: &SourceArgs) -> CliResult<ArchitectureProfile>
{
    if let Some(exe) = &args.exe {
        return Ok(architecture_of_image(&std::fs::read(exe)?)?);
    }

    let byte_order = if args.big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };
    let wchar_bits = (args.wchar_bits != 0).then_some(args.wchar_bits);
    Ok(ArchitectureProfile::new(args.pointer_size, byte_order)?.with_wchar_bit_size(wchar_bits))
}

fn summary_options(cli: &Cli, settings: &Settings) -> SummaryOptions
{
    let mut options = settings.summary_options();
    if let Some(max_len) = cli.max_len {
        options.max_string_len = max_len;
    }
    if cli.no_capping {
        options.capping = false;
    }
    options
}

/// Scalar type by name; `ptr` is an untyped pointer
fn scalar_type(name: &str, arch: &ArchitectureProfile) -> Result<Rc<TypeLayout>, FormatterError>
{
    if matches!(name, "ptr" | "void *" | "void*") {
        let void: TypeRef = Rc::new(TypeLayout::opaque("void"));
        return Ok(Rc::new(TypeLayout::pointer_to(void, arch)));
    }
    TypeLayout::primitive(name, arch)
        .map(Rc::new)
        .ok_or_else(|| FormatterError::InvalidArgument(format!("unknown scalar type {name:?}")))
}

fn print_summary(registry: &FormatterRegistry, value: &ValueRef, options: &SummaryOptions) -> CliResult<()>
{
    let mut out = String::new();
    match registry.summarize(&**value, &mut out, options) {
        Some(true) => {
            println!("{out}");
            Ok(())
        }
        _ => Err(format!("no summary available for the string at {}", value.address_of().0).into()),
    }
}

fn print_children(registry: &FormatterRegistry, value: &ValueRef) -> CliResult<()>
{
    let Some(mut children) = registry.synthetic_for(value) else {
        return Err(format!("no synthetic children for {}", value.compiler_type().name()).into());
    };

    let count = children.num_children();
    if count == 0 {
        println!("(no children: end or singular iterator)");
        return Ok(());
    }
    for index in 0..count {
        let Some(child) = children.child_at_index(index) else {
            continue;
        };
        let rendered = scalar_display(&*child).unwrap_or_else(|| "<unavailable>".to_owned());
        println!("{} = {}", child.name(), rendered);
    }
    Ok(())
}

/// Parse `0x`-prefixed hex or plain decimal
fn parse_address(s: &str) -> Result<u64, String>
{
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

#[cfg(test)]
mod tests
{
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_address()
    {
        assert_eq!(parse_address("0x1000"), Ok(0x1000));
        assert_eq!(parse_address("0XfF"), Ok(0xff));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0xzz").is_err());
        assert!(parse_address("").is_err());
    }

    #[test]
    fn test_parse_map_iter_command()
    {
        let cli = Cli::try_parse_from([
            "cxxview", "--dump", "core.bin", "--base", "0x400000", "--pointer-size", "4", "map-iter", "0x400010",
            "--key", "int", "--value", "double",
        ])
        .unwrap();

        assert_eq!(cli.source.base, Some(0x40_0000));
        assert_eq!(cli.source.pointer_size, 4);
        match cli.command {
            Commands::MapIter { address, key, value } => {
                assert_eq!(address, 0x40_0010);
                assert_eq!(key, "int");
                assert_eq!(value, "double");
            }
            other => panic!("Expected map-iter, got {other:?}"),
        }
    }

    #[test]
    fn test_dump_requires_base()
    {
        assert!(Cli::try_parse_from(["cxxview", "--dump", "core.bin", "string", "0x10"]).is_err());
        assert!(Cli::try_parse_from(["cxxview", "--dump", "core.bin", "--pid", "1", "--base", "0", "string", "0"]).is_err());
    }

    #[test]
    fn test_target_profile_from_flags()
    {
        let cli = Cli::try_parse_from([
            "cxxview", "--dump", "x", "--base", "0", "--pointer-size", "4", "--wchar-bits", "0", "--big-endian",
            "wstring", "0",
        ])
        .unwrap();
        let arch = target_profile(&cli.source).unwrap();
        assert_eq!(arch.address_byte_size(), 4);
        assert_eq!(arch.wchar_bit_size(), None);
        assert_eq!(arch.byte_order(), ByteOrder::Big);
    }

    #[test]
    fn test_cli_flags_override_settings()
    {
        let cli = Cli::try_parse_from(["cxxview", "--pid", "1", "--max-len", "8", "--no-capping", "string", "0"]).unwrap();
        let options = summary_options(&cli, &Settings::default());
        assert_eq!(options.max_string_len, 8);
        assert!(!options.capping);
    }

    #[test]
    fn test_scalar_types()
    {
        let arch = ArchitectureProfile::ilp32();
        assert_eq!(scalar_type("ptr", &arch).unwrap().alignment(), 4);
        assert!(scalar_type("int", &arch).is_ok());
        assert!(matches!(scalar_type("widget", &arch), Err(FormatterError::InvalidArgument(_))));
    }
}
