//! The `durance gallery` command for listing and filling photo slots.

use clap::{Args, Subcommand};
use console::Style;
use durance_core::{Config, Durability, Photo};
use std::path::PathBuf;

use super::{load_gallery, open_store};

/// Arguments for the `gallery` command.
#[derive(Args, Debug)]
pub struct GalleryArgs {
    #[command(subcommand)]
    pub command: GalleryCommand,
}

/// Subcommands for the gallery.
#[derive(Subcommand, Debug)]
pub enum GalleryCommand {
    /// List every slot with its durability
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Put an image into a slot
    Assign {
        /// Slot id
        id: String,

        /// Image file
        path: PathBuf,
    },
}

/// Execute the gallery command.
pub async fn execute(args: GalleryArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config);
    let mut gallery = load_gallery(store).await?;

    match args.command {
        GalleryCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(gallery.photos())?);
            } else {
                for photo in gallery.photos() {
                    println!("{}", format_row(photo));
                }
            }
        }

        GalleryCommand::Assign { id, path } => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            let path = std::fs::canonicalize(&expanded)
                .map_err(|e| anyhow::anyhow!("Cannot use image {expanded}: {e}"))?;
            if !path.is_file() {
                anyhow::bail!("Not a file: {}", path.display());
            }

            let photo = gallery.assign(&id, &path.to_string_lossy()).await?;
            println!("{}", format_row(photo));
        }
    }

    Ok(())
}

/// One line per slot: id, name, durability bar, image.
pub(crate) fn format_row(photo: &Photo) -> String {
    let style = match photo.durability() {
        Durability::Exhausted => Style::new().red(),
        Durability::Active if photo.percentage <= 30 => Style::new().yellow(),
        Durability::Active => Style::new().green(),
    };
    let filled = usize::from(photo.percentage) / 10;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(10 - filled));
    let image = photo.uri.as_deref().unwrap_or("(empty)");

    format!(
        "{:>3}  {:<12} [{}] {:>3}%  {}",
        photo.id,
        photo.name,
        style.apply_to(bar),
        photo.percentage,
        image
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_shows_empty_slot() {
        console::set_colors_enabled(false);
        let row = format_row(&Photo::new("1", "Slot 1").with_percentage(30));
        assert!(row.contains("[###-------]"));
        assert!(row.contains(" 30%"));
        assert!(row.ends_with("(empty)"));
    }

    #[test]
    fn row_shows_exhausted_photo() {
        console::set_colors_enabled(false);
        let row = format_row(&Photo::new("2", "cat").with_uri("/p/cat.jpg").with_percentage(0));
        assert!(row.contains("[----------]"));
        assert!(row.ends_with("/p/cat.jpg"));
    }
}
