// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod common;

use std::io::Write;
use std::path::PathBuf;

use futures::StreamExt;
use netflix_api::catalog::{self, CatalogType, Expand, Filter};
use netflix_api::ApiVersion;
use structopt::StructOpt;
use yansi::Paint;

#[derive(StructOpt)]
enum Args {
    /// Search the catalog for titles
    Titles {
        /// Text to search for
        term: String,
        /// Only list "disc" or "instant" titles
        #[structopt(long)]
        filter: Option<Filter>,
        /// Parts to include inline with each title, e.g. "@box_art"
        #[structopt(long)]
        expand: Vec<Expand>,
        /// Number of results to show
        #[structopt(long, default_value = "10")]
        max_results: u32,
    },
    /// Look for a title by its exact name
    Exact {
        /// Name of the title
        title: String,
    },
    /// Download one of the bulk catalog listings
    Dump {
        /// "full", "streaming", or "dvd"
        catalog_type: CatalogType,
        /// File to write the listing to
        #[structopt(parse(from_os_str))]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let client = common::Config::client(ApiVersion::V2);

    match Args::from_args() {
        Args::Titles {
            term,
            filter,
            expand,
            max_results,
        } => {
            let mut search = catalog::search(term).max_results(max_results);
            if let Some(filter) = filter {
                search = search.filter(filter);
            }
            for part in expand {
                search = search.expand(part);
            }

            let results = search.call(&client).await?;
            for title in results["catalog"].as_array().into_iter().flatten() {
                println!(
                    "{} ({})",
                    Paint::new(title["title"].as_str().unwrap_or("?")).bold(),
                    title["release_year"]
                );
                println!("    {}", Paint::blue(title["id"].as_str().unwrap_or("")));
            }
        }
        Args::Exact { title } => match catalog::movie_by_title(&client, &title, None).await? {
            Some(movie) => println!("{}", serde_json::to_string_pretty(&movie)?),
            None => println!("{} {}", Paint::yellow("Nothing is titled"), title),
        },
        Args::Dump {
            catalog_type,
            output,
        } => {
            let mut listing = catalog::full_catalog(&client, catalog_type).await?;
            if let Some(encoding) = listing.content_encoding() {
                println!("Listing is {}-encoded, writing it as-is", encoding);
            }

            let mut file = std::fs::File::create(&output)?;
            let mut written = 0;
            while let Some(chunk) = listing.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)?;
                written += chunk.len();
            }
            println!("Wrote {} bytes to {}", written, output.display());
        }
    }

    Ok(())
}
