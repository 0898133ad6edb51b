use clap::{Parser, Subcommand};
use arctool::{Archive, Endian, Index};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arctool", about = "ARC/IND game-archive tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an .arc archive into a directory
    Extract {
        input: PathBuf,
        /// Byte order of the archive: le or be
        #[arg(short, long, default_value = "le")]
        endian: String,
        /// Output directory (defaults to the archive name without extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pack a directory into an .arc archive, in files.list order
    Create {
        input: PathBuf,
        /// Byte order of the archive: le or be
        #[arg(short, long, default_value = "le")]
        endian: String,
        /// Output archive path (extension forced to .arc)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Refresh index.ind from the .arc archives next to it
    UpdateIndex {
        dir: PathBuf,
        /// Byte order of the index and its archives: le or be
        #[arg(short, long, default_value = "le")]
        endian: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input, endian, output } => {
            let endian = parse_endian(&endian)?;
            let out_dir = output.unwrap_or_else(|| stem_of(&input));

            let mut arc = Archive::new(endian);
            arc.import(File::open(&input)?)?;

            std::fs::create_dir_all(&out_dir)?;
            let mut manifest = String::new();
            for (entry, payload) in arc.entries.iter().zip(&arc.payloads) {
                println!("Extracting {}...", entry.name);
                std::fs::write(out_dir.join(&entry.name), payload)?;
                manifest.push_str(&entry.name);
                manifest.push('\n');
            }
            // files.list preserves the file-table order for create
            std::fs::write(out_dir.join("files.list"), manifest)?;
            println!("Extracted to: {}", out_dir.display());
        }

        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { input, endian, output } => {
            let endian = parse_endian(&endian)?;
            let out_path = with_arc_extension(output.unwrap_or_else(|| stem_of(&input)));

            let manifest = std::fs::read_to_string(input.join("files.list"))?;
            let mut arc = Archive::new(endian);
            for name in manifest.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
                println!("Adding {}...", name);
                arc.add_file(name, std::fs::read(input.join(name))?);
            }
            arc.export(File::create(&out_path)?)?;
            println!("Created: {}", out_path.display());
        }

        // ── Update index ─────────────────────────────────────────────────────
        Commands::UpdateIndex { dir, endian } => {
            let endian = parse_endian(&endian)?;
            let index_path = dir.join("index.ind");

            let mut ind = Index::new(&dir, endian);
            ind.import(File::open(&index_path)?)?;
            print!("Updating index.ind... ");
            ind.synchronize()?;
            ind.export(File::create(&index_path)?)?;
            println!("Done!");
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_endian(s: &str) -> Result<Endian, String> {
    Endian::from_name(s).ok_or_else(|| format!("invalid endianness '{s}' (expected le or be)"))
}

fn stem_of(path: &PathBuf) -> PathBuf {
    path.file_stem().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("out"))
}

fn with_arc_extension(mut path: PathBuf) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("arc") => path,
        _ => {
            path.set_extension("arc");
            path
        }
    }
}
