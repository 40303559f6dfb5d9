//! Interactive debugger: breakpoints and watchpoints observed from the
//! machine's interception hooks, driving a command REPL on stdin.

mod command;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use crate::runtime::{Interceptor, Machine};
use crate::symbol::SymTable;
use crate::term;

pub use command::{Command, CommandError, Location, RegTarget};

/// A code address execution stops at.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Breakpoint {
    pub address: u16,
}

/// A memory address whose accesses stop execution.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Watchpoint {
    pub address: u16,
    pub kind: WatchKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WatchKind {
    Read,
    Write,
    ReadWrite,
}

impl WatchKind {
    fn observes_read(self) -> bool {
        matches!(self, WatchKind::Read | WatchKind::ReadWrite)
    }

    fn observes_write(self) -> bool {
        matches!(self, WatchKind::Write | WatchKind::ReadWrite)
    }

    fn name(self) -> &'static str {
        match self {
            WatchKind::Read => "read",
            WatchKind::Write => "write",
            WatchKind::ReadWrite => "readwrite",
        }
    }
}

/// Debugger state threaded into the machine as its [`Interceptor`].
///
/// `break_flag` may be set from anywhere (the tty keyboard endpoint sets it
/// on Ctrl-C) and forces a stop before the next fetch. `exit` tells the
/// owning run loop to stop stepping altogether.
pub struct Debugger {
    pub break_flag: Arc<AtomicBool>,
    pub exit: Arc<AtomicBool>,
    breakpoints: Vec<Breakpoint>,
    watchpoints: Vec<Watchpoint>,
    symtable: Option<SymTable>,
    /// Source text of the assembly the symbol table refers to.
    source: Option<String>,
    /// Pristine image for `reset`.
    image: Vec<u8>,
    last_line: String,
}

impl Interceptor for Debugger {
    fn step(&mut self, mc: &mut Machine) {
        if self.break_flag.load(Ordering::Relaxed) {
            self.repl(mc);
            return;
        }

        if self
            .breakpoints
            .iter()
            .any(|bp| bp.address == mc.state.program)
        {
            println!("\nProgram stopped");
            self.print_source(mc.state.program, 8);
            self.repl(mc);
        }
    }

    fn read(&mut self, addr: u16, mc: &mut Machine) {
        if self
            .watchpoints
            .iter()
            .any(|wp| wp.address == addr && wp.kind.observes_read())
        {
            println!("\nProgram stopped");
            self.print_mem(mc, addr, 1);
            self.repl(mc);
        }
    }

    fn write(&mut self, addr: u16, mc: &mut Machine) {
        if self
            .watchpoints
            .iter()
            .any(|wp| wp.address == addr && wp.kind.observes_write())
        {
            println!("\nProgram stopped");
            self.print_mem(mc, addr, 1);
            self.repl(mc);
        }
    }
}

impl Debugger {
    pub fn new(image: Vec<u8>, symtable: Option<SymTable>, source: Option<String>) -> Self {
        Debugger {
            break_flag: Arc::new(AtomicBool::new(false)),
            exit: Arc::new(AtomicBool::new(false)),
            breakpoints: Vec::new(),
            watchpoints: Vec::new(),
            symtable,
            source,
            image,
            last_line: String::new(),
        }
    }

    /// Reads and runs commands until one resumes execution or quits. The
    /// terminal leaves raw mode while the user types.
    pub fn repl(&mut self, mc: &mut Machine) {
        term::exit_raw();

        let stdin = io::stdin();
        loop {
            print!("{} ", "(dbg)".dimmed());
            let _ = io::stdout().flush();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                // EOF: nothing more to drive the machine with
                println!();
                self.exit.store(true, Ordering::Relaxed);
                return;
            }

            let line = line.trim();
            let line = if line.is_empty() {
                // Empty line repeats the last command
                if self.last_line.is_empty() {
                    continue;
                }
                self.last_line.clone()
            } else {
                self.last_line = line.to_string();
                line.to_string()
            };

            let command = match Command::try_from(line.as_str()) {
                Ok(command) => command,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };

            match command {
                Command::Continue => {
                    self.break_flag.store(false, Ordering::Relaxed);
                    break;
                }
                Command::Next => {
                    self.break_flag.store(true, Ordering::Relaxed);
                    break;
                }
                Command::Quit => {
                    self.exit.store(true, Ordering::Relaxed);
                    return;
                }
                command => self.dispatch(command, mc),
            }
        }

        term::enter_raw();
    }

    fn dispatch(&mut self, command: Command, mc: &mut Machine) {
        match command {
            Command::BreakAdd { address } => {
                if !self.breakpoints.iter().any(|bp| bp.address == address) {
                    self.breakpoints.push(Breakpoint { address });
                    println!("Breakpoint added [{address:#06x}]");
                }
            }
            Command::BreakList => {
                for (i, bp) in self.breakpoints.iter().enumerate() {
                    println!("#{i}: {:#06x}", bp.address);
                }
            }
            Command::BreakRemove { index } => {
                if index < self.breakpoints.len() {
                    self.breakpoints.swap_remove(index);
                    println!("Breakpoint removed [{index}]");
                } else {
                    println!("Invalid breakpoint number");
                }
            }
            Command::BreakClear => {
                self.breakpoints.clear();
                println!("Breakpoints reset");
            }

            Command::WatchAdd { address, kind } => {
                let exists = self
                    .watchpoints
                    .iter()
                    .any(|wp| wp.address == address && wp.kind == kind);
                if !exists {
                    self.watchpoints.push(Watchpoint { address, kind });
                    println!("Watchpoint added [{address:#06x}] ({})", kind.name());
                }
            }
            Command::WatchList => {
                for (i, wp) in self.watchpoints.iter().enumerate() {
                    println!("#{i}: {:#06x} {}", wp.address, wp.kind.name());
                }
            }
            Command::WatchRemove { index } => {
                if index < self.watchpoints.len() {
                    self.watchpoints.swap_remove(index);
                    println!("Watchpoint removed [{index}]");
                } else {
                    println!("Invalid watchpoint number");
                }
            }
            Command::WatchClear => {
                self.watchpoints.clear();
                println!("Watchpoints reset");
            }

            Command::Registers => {
                for (i, register) in mc.state.registers.iter().enumerate() {
                    print!("{} {register:#06x}\t", format!("R{i}:").bold());
                    if i == 3 {
                        println!();
                    }
                }
                println!();
                println!(
                    "{} {:#06x}\t{} {:#06x}",
                    "PC:".bold(),
                    mc.state.program,
                    "PS:".bold(),
                    mc.state.procstat
                );
            }
            Command::RegisterSet { target, value } => {
                match target {
                    RegTarget::R(n) => mc.state.registers[n as usize] = value,
                    RegTarget::Pc => mc.state.program = value,
                    RegTarget::Ps => mc.state.procstat = value,
                }
                println!("{} {value:#06x}", "set:".bold());
            }

            Command::Memory { target, count } => {
                let addr = match self.locate(target, mc.state.program) {
                    Some(addr) => addr,
                    None => return,
                };
                self.print_mem(mc, addr, count);
            }
            Command::Set { address, value } => {
                mc.state.memory[address as usize] = value;
                self.print_mem(mc, address, 1);
            }

            Command::Source { target, count } => {
                let addr = match self.locate(target, mc.state.program) {
                    Some(addr) => addr,
                    None => return,
                };
                self.print_source(addr, count);
            }
            Command::Labels => {
                let Some(table) = &self.symtable else {
                    println!("No symbol table loaded");
                    return;
                };
                let mut labels: Vec<_> = table.labels.iter().collect();
                labels.sort();
                for (addr, label) in labels {
                    println!("{} {label}", format!("[{addr:#06x}]").bold());
                }
            }

            Command::Jump { target } => {
                let Some(addr) = self.locate(Some(target), mc.state.program) else {
                    return;
                };
                mc.state.program = addr;
                println!("{} {addr:#06x}", "PC:".bold());
            }

            Command::ClearScreen => print!("\x1b[H\x1b[2J"),
            Command::Reset => {
                if let Err(err) = mc.load_image(&mut self.image.as_slice()) {
                    println!("Error reloading binary: {err}");
                }
            }

            Command::Continue | Command::Next | Command::Quit => unreachable!("handled by repl"),
        }
    }

    /// Resolves an optional location argument, defaulting to `fallback` and
    /// looking labels up in the symbol table.
    fn locate(&self, target: Option<Location>, fallback: u16) -> Option<u16> {
        match target {
            None => Some(fallback),
            Some(Location::Address(addr)) => Some(addr),
            Some(Location::Label(label)) => {
                let found = self
                    .symtable
                    .as_ref()
                    .and_then(|table| table.address_of(&label));
                if found.is_none() {
                    println!("Unable to find '{label}'");
                }
                found
            }
        }
    }

    fn print_mem(&self, mc: &Machine, addr: u16, count: u16) {
        for i in 0..count {
            let addr = addr.wrapping_add(i);
            if i % 4 == 0 {
                if i > 0 {
                    println!();
                }
                print!("{} ", format!("[{addr:#06x}]").bold());
            }
            let value = mc.state.memory[addr as usize];
            if value == 0 {
                print!("{} ", format!("{value:#06x}").dimmed());
            } else {
                print!("{value:#06x} ");
            }
        }
        println!();
    }

    /// Lists `count` source lines starting from the line that produced the
    /// word at `addr`, marking lines that map back to an address.
    fn print_source(&self, addr: u16, count: u16) {
        let Some(source) = &self.source else {
            println!("No source file loaded");
            return;
        };
        let Some(table) = &self.symtable else {
            println!("No symbol table loaded");
            return;
        };
        let Some(&offset) = table.symbols.get(&addr) else {
            println!("No instruction found at {addr:#06x}");
            return;
        };

        let mut offset = offset;
        for line in source
            .get(offset as usize..)
            .unwrap_or("")
            .split('\n')
            .take(count as usize)
        {
            match table.address_at_offset(offset) {
                Some(lineaddr) => print!("{} ", format!("[{lineaddr:#06x}]").bold()),
                None => print!("{} ", "~~~~~~~~".dimmed()),
            }
            println!("{}", line.strip_suffix('\r').unwrap_or(line));
            offset += line.len() as i64 + 1;
        }
    }
}
