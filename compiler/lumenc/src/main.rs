//! Lumen shader compiler CLI.

use lumenc::commands::{check_file, compile_file, list_targets, parse_compile_options, CliError};

fn main() {
    lumenc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "compile" => {
            if args.len() < 3 {
                print_compile_usage();
                std::process::exit(1);
            }
            let options = parse_compile_options(&args[2..]).unwrap_or_else(|e| usage_error(&e));

            match compile_file(&options) {
                Ok(entries) => {
                    if !options.quiet {
                        for entry in entries {
                            println!("{entry}");
                        }
                    }
                }
                Err(e) => fail(&e),
            }
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: lumenc check <file.lsl> [-I <dir>] [--format=<name>]");
                std::process::exit(1);
            }
            let options = parse_compile_options(&args[2..]).unwrap_or_else(|e| usage_error(&e));

            match check_file(&options) {
                Ok(report) => {
                    print!("{report}");
                    if report.has_unresolved_imports() {
                        std::process::exit(1);
                    }
                }
                Err(e) => fail(&e),
            }
        }
        "targets" => {
            print!("{}", list_targets());
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("lumenc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn fail(err: &CliError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

fn usage_error(err: &CliError) -> ! {
    eprintln!("error: {err}");
    eprintln!();
    print_compile_usage();
    std::process::exit(1);
}

fn print_compile_usage() {
    eprintln!("Usage: lumenc compile <file.lsl> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --format=<name>     Output format: spirv, dxil, dxbc, metal, wgsl");
    eprintln!("  --profile=<name>    Target profile (default depends on format)");
    eprintln!("  --entry=<name>      Emit only this entry point");
    eprintln!("  --row-major         Row-major matrix layout");
    eprintln!("  --scalar-layout     Scalar block layout");
    eprintln!("  --debug-info, -g    Keep names and source locations");
    eprintln!("  --obfuscate         Strip names from the output");
    eprintln!("  -I <dir>            Add an import search path");
    eprintln!("  -o <path>           Output file (or directory for several entries)");
    eprintln!("  --quiet, -q         No compiler output, no summary");
    eprintln!("  --diagnostics       Show compiler output in release builds too");
    eprintln!("  --color=<mode>      auto, always, never");
}

fn print_usage() {
    println!("Lumen shader compiler");
    println!();
    println!("Usage: lumenc <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <file.lsl>   Emit bytecode for the module's entry points");
    println!("  check <file.lsl>     Parse a module and list its entry points and imports");
    println!("  targets              List output formats and profiles");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Examples:");
    println!("  lumenc compile mesh.lsl");
    println!("  lumenc compile mesh.lsl --entry=VertexMain -o mesh.vert.spv");
    println!("  lumenc compile mesh.lsl --format=dxil --profile=sm_6_6 -I include");
    println!("  lumenc check mesh.lsl");
    println!();
    println!("Set RUST_LOG=lumen_session=debug to trace cache and link activity.");
}
