//! colldb CLI Client
//!
//! Command-line interface for interacting with a colldb server.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use colldb::Client;

/// colldb CLI
#[derive(Parser, Debug)]
#[command(name = "colldb-cli")]
#[command(about = "CLI for the colldb key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7777")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key in a collection
    Set {
        collection: String,
        key: String,
        /// Value words, joined with single spaces
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },

    /// Get a value by key
    Get { collection: String, key: String },

    /// Delete a key
    Delete { collection: String, key: String },

    /// Drop a whole collection
    Drop { collection: String },

    /// Read requests from stdin, one per line
    Shell,
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let request = match args.command {
        Commands::Set {
            collection,
            key,
            value,
        } => format!("set {} {} {}", collection, key, value.join(" ")),
        Commands::Get { collection, key } => format!("get {} {}", collection, key),
        Commands::Delete { collection, key } => format!("delete {} {}", collection, key),
        Commands::Drop { collection } => format!("drop {}", collection),
        Commands::Shell => {
            if let Err(e) = run_shell(&mut client) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            return;
        }
    };

    match client.send(&request) {
        Ok(response) => println!("{}", response),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run_shell(client: &mut Client) -> colldb::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            println!("{}", client.send(&line)?);
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}
