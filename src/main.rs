use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, MietteHandlerOpts, Result};

use braid::debugger::Debugger;
use braid::runtime::{BufferedKeyboard, Machine, StreamDisplay, MEMSPACE_DEVICES};
use braid::term::{self, RawKeyboard};
use braid::{assemble, SymTable};

/// Braid is an assembler, interpreter and debugger for the LC3 architecture.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a `.asm` file into a binary image
    Asm {
        /// `.asm` file to assemble; read from stdin when piped
        file: Option<PathBuf>,
        /// Destination for the image
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also emit a `.lc3db` symbol table next to the image
        #[arg(long)]
        debug: bool,
    },
    /// Run a compiled image
    Run {
        /// `.lc3` image to execute
        file: PathBuf,
        /// Start in the debugger, loading `.lc3db` symbols when present
        #[arg(long)]
        debug: bool,
    },
    /// Assemble without writing any output
    Check {
        /// `.asm` file to check
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(MietteHandlerOpts::new().terminal_links(false).build())
    }));

    match Args::parse().command {
        Command::Asm { file, out, debug } => cmd_asm(file, out, debug),
        Command::Run { file, debug } => cmd_run(file, debug),
        Command::Check { file } => cmd_check(file),
    }
}

fn cmd_asm(file: Option<PathBuf>, out: Option<PathBuf>, debug: bool) -> Result<()> {
    let (source, source_path) = read_source(file)?;
    let target = source_path
        .as_ref()
        .and_then(|path| path.to_str())
        .unwrap_or("<stdin>");
    println!("{:>12} target {}", "Assembling".green().bold(), target);

    let mut symtable = debug.then(SymTable::new);
    if let (Some(table), Some(path)) = (symtable.as_mut(), source_path.as_ref()) {
        table.source = fs::canonicalize(path)
            .map(|path| path.display().to_string())
            .unwrap_or_default();
    }

    let (image, errors) = assemble(&source, symtable.as_mut());
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{:?}", err.report(&source));
        }
        bail!("assembly failed with {} error(s)", errors.len());
    }

    let out = out.unwrap_or_else(|| match &source_path {
        Some(path) => path.with_extension("lc3"),
        None => PathBuf::from("out.lc3"),
    });
    write_image(&image, &out).into_diagnostic()?;
    println!("{:>12} binary", "Finished".green().bold());
    println!("{:>12} {}", "Saved to".green().bold(), out.display());

    if let Some(table) = &symtable {
        let db = out.with_extension("lc3db");
        let encoded = serde_json::to_string(table).into_diagnostic()?;
        fs::write(&db, encoded).into_diagnostic()?;
        println!("{:>12} {}", "Symbols".green().bold(), db.display());
    }

    Ok(())
}

fn cmd_check(file: PathBuf) -> Result<()> {
    println!(
        "{:>12} target {}",
        "Checking".green().bold(),
        file.display()
    );
    let source = fs::read_to_string(&file).into_diagnostic()?;
    let (_, errors) = assemble(&source, None);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{:?}", err.report(&source));
        }
        bail!("check failed with {} error(s)", errors.len());
    }
    println!("{:>12} with 0 errors", "Finished".green().bold());
    Ok(())
}

fn cmd_run(file: PathBuf, debug: bool) -> Result<()> {
    let image = fs::read(&file).into_diagnostic()?;

    let mut mc = Machine::new();
    mc.load_image(&mut image.as_slice()).into_diagnostic()?;
    mc.display = Some(Box::new(StreamDisplay::new(io::stdout())));

    let interrupt = Arc::new(AtomicBool::new(false));
    if term::stdin_is_tty() {
        mc.keyboard = Some(Box::new(RawKeyboard::new(interrupt.clone())));
    } else if debug {
        // The piped stream belongs to the REPL; the machine gets no keys
        mc.keyboard = Some(Box::new(BufferedKeyboard::default()));
    } else {
        // Piped input is known up front; serve it from a buffer
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes).into_diagnostic()?;
        mc.keyboard = Some(Box::new(BufferedKeyboard::new(bytes)));
    }

    let exit = if debug {
        let mut dbg = load_debugger(&file, image);
        dbg.break_flag = interrupt.clone();
        let exit = dbg.exit.clone();
        // Give the user a chance to place breakpoints before the first step
        dbg.repl(&mut mc);
        mc.debugger = Some(Box::new(dbg));
        exit
    } else {
        interrupt
    };

    term::enter_raw();
    let result: Result<()> = (|| {
        while mc.state.program < MEMSPACE_DEVICES && !exit.load(Ordering::Relaxed) {
            mc.step().into_diagnostic()?;
        }
        Ok(())
    })();
    term::exit_raw();
    result
}

/// Builds the debugger for an image, picking up the sibling `.lc3db` symbol
/// table and the source file it points at when they exist.
fn load_debugger(file: &PathBuf, image: Vec<u8>) -> Debugger {
    let symtable = fs::read_to_string(file.with_extension("lc3db"))
        .ok()
        .and_then(|encoded| serde_json::from_str::<SymTable>(&encoded).ok());

    let source = symtable
        .as_ref()
        .filter(|table| !table.source.is_empty())
        .and_then(|table| fs::read_to_string(&table.source).ok());

    Debugger::new(image, symtable, source)
}

fn read_source(file: Option<PathBuf>) -> Result<(String, Option<PathBuf>)> {
    match file {
        Some(path) => {
            let source = fs::read_to_string(&path).into_diagnostic()?;
            Ok((source, Some(path)))
        }
        None if !term::stdin_is_tty() => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).into_diagnostic()?;
            Ok((source, None))
        }
        None => bail!("no input file; name a `.asm` file or pipe source on stdin"),
    }
}

fn write_image(image: &[u16], out: &PathBuf) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(out)?);
    for word in image {
        file.write_all(&word.to_be_bytes())?;
    }
    file.flush()
}
