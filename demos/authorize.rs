// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod common;

use netflix_api::ApiVersion;
use yansi::Paint;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_logging();
    let mut config = common::Config::load(ApiVersion::V2);

    if config.token.is_some() {
        println!("Found a saved token, checking that it still works...");
    } else {
        config.authorize().await?;
    }

    let user = config.user().await?;
    match user.details().await {
        Ok(details) => {
            println!("{} user {}", Paint::green("Authorized as"), Paint::new(user.id()).bold());
            let name = &details["user"];
            let first = name["first_name"].as_str();
            let last = name["last_name"].as_str();
            if let (Some(first), Some(last)) = (first, last) {
                println!("Welcome, {} {}!", first, last);
            }
        }
        Err(err) => {
            println!("{} {}", Paint::red("The saved token was refused:"), err);
            println!("Delete netflix_settings.json and run this again to reauthorize.");
        }
    }

    Ok(())
}
