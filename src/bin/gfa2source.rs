use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::time::Instant;
use std::{env, process};

use gbz_source::{gfa, translation, utils};
use gbz_source::{GFAParams, TranslationPolicy};
use getopts::Options;

//-----------------------------------------------------------------------------

// Extension for the node-level GFA file.
const NODE_GFA_EXTENSION: &str = ".nodes.gfa";

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();
    let level = if config.verbose { log::LevelFilter::Info } else { log::LevelFilter::Warn };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Check the output files.
    let gfa_file = format!("{}{}", config.base_name, NODE_GFA_EXTENSION);
    let trans_file = format!("{}{}", config.base_name, translation::TRANSLATION_EXTENSION);
    for filename in [&gfa_file, &trans_file] {
        if utils::file_exists(filename) {
            if config.overwrite {
                eprintln!("Overwriting file {}", filename);
                fs::remove_file(filename).map_err(|x| x.to_string())?;
            } else {
                return Err(format!("File {} already exists", filename));
            }
        }
    }

    // Build the graph.
    let graph = gfa::load_gfa(&config.input_file, &config.params).map_err(|x| x.to_string())?;
    let source = graph.source();

    // Write the node-level graph.
    let mut output = BufWriter::new(File::create(&gfa_file).map_err(|x| x.to_string())?);
    gfa::write_gfa(&graph, &mut output).map_err(|x| x.to_string())?;
    output.flush().map_err(|x| x.to_string())?;

    // Write the translation.
    if source.uses_translation() {
        translation::save_translation(source.translation(), &trans_file).map_err(|x| x.to_string())?;
    }

    // Statistics.
    eprintln!(
        "The graph contains {} segments, {} nodes ({} bp), and {} edges",
        graph.segment_count(), source.node_count(), source.total_length(), graph.link_count()
    );
    if let Some(size) = utils::file_size(&gfa_file) {
        eprintln!("Node graph: {} ({})", gfa_file, size);
    }
    if source.uses_translation() {
        if let Some(size) = utils::file_size(&trans_file) {
            eprintln!("Translation: {} ({})", trans_file, size);
        }
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub input_file: String,
    pub base_name: String,
    pub params: GFAParams,
    pub overwrite: bool,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] graph.gfa[.gz]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "base name for output files (default: input without .gfa[.gz])", "BASE");
        let max_length_desc = format!("maximum length of a translated node (default: {})", GFAParams::MAX_NODE_LENGTH);
        opts.optopt("m", "max-node-length", &max_length_desc, "INT");
        opts.optopt("s", "start-id", "first node identifier for translated segments (default: 1)", "INT");
        opts.optopt("t", "translation", "translate segments: auto, always, never (default: auto)", "STR");
        opts.optflag("", "overwrite", "overwrite the output files if they exist");
        opts.optflag("v", "verbose", "print progress information");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let input_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let base_name = matches.opt_str("o").unwrap_or_else(|| default_base_name(&input_file));

        let mut params = GFAParams::default();
        if let Some(s) = matches.opt_str("m") {
            params.max_node_length = parse_positive(&s, "--max-node-length");
        }
        if let Some(s) = matches.opt_str("s") {
            params.start_id = parse_positive(&s, "--start-id");
        }
        if let Some(s) = matches.opt_str("t") {
            params.translation = match s.parse::<TranslationPolicy>() {
                Ok(policy) => policy,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
        }

        Config {
            input_file,
            base_name,
            params,
            overwrite: matches.opt_present("overwrite"),
            verbose: matches.opt_present("v"),
        }
    }
}

fn parse_positive(value: &str, option: &str) -> usize {
    match value.parse::<usize>() {
        Ok(x) if x > 0 => x,
        Ok(_) => {
            eprintln!("Error: {} must be positive", option);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to parse {}: {}", option, e);
            process::exit(1);
        }
    }
}

fn default_base_name(input_file: &str) -> String {
    let name = input_file.strip_suffix(".gz").unwrap_or(input_file);
    let name = name.strip_suffix(".gfa").unwrap_or(name);
    name.to_string()
}

//-----------------------------------------------------------------------------
