//! Command line interface

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;

use migsat::compiler::{
    Compiler, CompilerSettings, EggEngine, DEFAULT_ITER_LIMIT, DEFAULT_NODE_LIMIT,
    DEFAULT_TIME_LIMIT,
};
use migsat::equiv::check_equivalence_comb;
use migsat::io::{read_network_file, write_network_file};
use migsat::stats::stats;
use migsat::Network;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a logic network
    ///
    /// Will print statistics on the number of inputs, outputs and majority gates in the network.
    #[clap()]
    Show(ShowArgs),

    /// Compile a logic network with equality saturation
    ///
    /// The network is optimized, compiled to a straight-line program, and the statistics of
    /// the run are printed.
    #[clap()]
    Compile(CompileArgs),

    /// Rewrite a logic network with equality saturation
    ///
    /// The optimized network is written to the output file.
    #[clap(alias = "opt")]
    Rewrite(RewriteArgs),

    /// Check equivalence between two logic networks
    ///
    /// The command will fail if the two networks are not equivalent, and will output the
    /// failing test pattern.
    #[clap(alias = "equiv")]
    CheckEquivalence(EquivArgs),
}

impl Commands {
    /// Whether progress should be reported at info level
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Compile(args) => args.saturation.verbose,
            Commands::Rewrite(args) => args.saturation.verbose,
            _ => false,
        }
    }

    /// Run the command
    pub fn run(&self) -> Result<(), String> {
        match self {
            Commands::Show(args) => args.run(),
            Commands::Compile(args) => args.run(),
            Commands::Rewrite(args) => args.run(),
            Commands::CheckEquivalence(args) => args.run(),
        }
    }
}

/// Options of the saturation engine
#[derive(Args)]
pub struct SaturationArgs {
    /// Report the saturation and the timings
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Skip the local simplification before saturation
    #[arg(long)]
    no_preoptimize: bool,

    /// Skip the saturation, and extract the network as is
    #[arg(long)]
    no_rewrite: bool,

    /// Maximum number of saturation iterations
    #[arg(long, default_value_t = DEFAULT_ITER_LIMIT)]
    iter_limit: usize,

    /// Maximum number of e-nodes
    #[arg(long, default_value_t = DEFAULT_NODE_LIMIT)]
    node_limit: usize,

    /// Maximum saturation time, in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT.as_secs_f64())]
    time_limit: f64,
}

impl SaturationArgs {
    fn settings(&self, print_program: bool) -> CompilerSettings {
        CompilerSettings::new(print_program, self.verbose)
            .with_preoptimize(!self.no_preoptimize)
            .with_rewrite(!self.no_rewrite)
    }

    fn compiler(&self) -> Result<Compiler, String> {
        let time_limit = Duration::try_from_secs_f64(self.time_limit)
            .map_err(|e| format!("Invalid time limit {}: {e}", self.time_limit))?;
        Ok(Compiler::new(
            EggEngine::default()
                .with_iter_limit(self.iter_limit)
                .with_node_limit(self.node_limit)
                .with_time_limit(time_limit),
        ))
    }
}

/// Command arguments for compilation
#[derive(Args)]
pub struct CompileArgs {
    /// Network to compile
    file: PathBuf,

    /// Print the compiled program
    #[arg(long)]
    print_program: bool,

    #[command(flatten)]
    saturation: SaturationArgs,
}

impl CompileArgs {
    pub fn run(&self) -> Result<(), String> {
        let mut mig = read_network_file(&self.file)?;
        let compiler = self.saturation.compiler()?;
        let stats = compiler
            .compile(self.saturation.settings(self.print_program), &mut mig)
            .map_err(|e| e.to_string())?;
        println!("{}", stats);
        Ok(())
    }
}

/// Command arguments for rewriting
#[derive(Args)]
pub struct RewriteArgs {
    /// Network to rewrite
    file: PathBuf,

    /// Output file for the rewritten network
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Check the rewritten network against the original with a SAT solver
    #[arg(long)]
    check: bool,

    #[command(flatten)]
    saturation: SaturationArgs,
}

impl RewriteArgs {
    pub fn run(&self) -> Result<(), String> {
        let mut mig = read_network_file(&self.file)?;
        let original = mig.clone();
        let compiler = self.saturation.compiler()?;
        let (rewritten, run_stats) = compiler
            .rewrite(self.saturation.settings(false), &mut mig)
            .map_err(|e| e.to_string())?;
        println!("Before:\n{}", stats(&sorted_copy(&original)));
        println!("After:\n{}", stats(&rewritten));
        println!("{}", run_stats);
        if self.check {
            check_equivalence_comb(&sorted_copy(&original), &rewritten).map_err(|pattern| {
                format!(
                    "Rewritten network is not equivalent, failing pattern: {}",
                    format_pattern(&pattern)
                )
            })?;
            println!("Rewritten network is equivalent");
        }
        write_network_file(&self.output, &rewritten)
    }
}

/// Copy of a network in topological order, as required by statistics and equivalence checking
fn sorted_copy(mig: &Network) -> Network {
    let mut ret = mig.clone();
    if !ret.is_topo_sorted() {
        ret.topo_sort();
    }
    ret
}

fn format_pattern(pattern: &[bool]) -> String {
    pattern.iter().map(|b| if *b { '1' } else { '0' }).join("")
}

/// Command arguments for network informations
#[derive(Args)]
pub struct ShowArgs {
    /// Network to show
    file: PathBuf,
}

impl ShowArgs {
    pub fn run(&self) -> Result<(), String> {
        let mig = read_network_file(&self.file)?;
        println!("Network stats:\n{}\n\n", stats(&sorted_copy(&mig)));
        Ok(())
    }
}

/// Command arguments for equivalence checking
#[derive(Args)]
pub struct EquivArgs {
    /// First network to compare
    file1: PathBuf,
    /// Second network to compare
    file2: PathBuf,
}

impl EquivArgs {
    pub fn run(&self) -> Result<(), String> {
        let mig1 = sorted_copy(&read_network_file(&self.file1)?);
        let mig2 = sorted_copy(&read_network_file(&self.file2)?);
        if mig1.nb_inputs() != mig2.nb_inputs() {
            println!(
                "Different number of inputs: {} vs {}. Networks are not equivalent",
                mig1.nb_inputs(),
                mig2.nb_inputs()
            );
            std::process::exit(1);
        }
        if mig1.nb_outputs() != mig2.nb_outputs() {
            println!(
                "Different number of outputs: {} vs {}. Networks are not equivalent",
                mig1.nb_outputs(),
                mig2.nb_outputs()
            );
            std::process::exit(1);
        }
        match check_equivalence_comb(&mig1, &mig2) {
            Err(pattern) => {
                println!("Networks are not equivalent");
                println!("Test pattern: {}", format_pattern(&pattern));
                std::process::exit(1);
            }
            Ok(()) => {
                println!("Networks are equivalent");
                Ok(())
            }
        }
    }
}
