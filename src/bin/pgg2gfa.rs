use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use std::{env, process};

use pgg_base::{formats, utils, PggBase};
use getopts::Options;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();
    utils::init_logging(config.verbosity);

    // Load the graph.
    let database = PggBase::open(&config.db_file)?;
    let graph = database.load_graph(&config.contig)?.ok_or(
        format!("Contig {} is not in database {}", config.contig, config.db_file)
    )?;
    eprintln!(
        "Contig {}: {} reference bases, {} nodes, {} edges",
        graph.contig(), graph.reference_len(), graph.nodes(), graph.edge_count()
    );

    // GFA output.
    let output: Box<dyn Write> = match config.output.as_ref() {
        Some(filename) => Box::new(File::create(filename).map_err(|x| format!("{}: {}", filename, x))?),
        None => Box::new(io::stdout()),
    };
    let mut output = BufWriter::new(output);
    formats::write_gfa(&graph, &mut output).map_err(|x| x.to_string())?;
    output.flush().map_err(|x| x.to_string())?;

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub db_file: String,
    pub contig: String,
    pub output: Option<String>,
    pub verbosity: usize,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "write the GFA to this file (default: stdout)", "FILE");
        opts.optflagmulti("v", "verbose", "print progress information; repeat for more");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] graph.db contig", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() != 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }

        Config {
            db_file: matches.free[0].clone(),
            contig: matches.free[1].clone(),
            output: matches.opt_str("o"),
            verbosity: matches.opt_count("v"),
        }
    }
}

//-----------------------------------------------------------------------------
