// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//since this is going to get included in demos that might not use everything, clear out warnings
//that are unnecessary
#![allow(dead_code)]

use std::io::Write;

use netflix_api::auth::{self, AccessToken};
use netflix_api::user::User;
use netflix_api::{ApiVersion, Netflix};

//This is not a demo that can be built with cargo! This is some helper code for the other demos so
//they can load keys from the same place.

const SETTINGS_FILE: &str = "netflix_settings.json";

pub struct Config {
    pub client: Netflix,
    pub token: Option<AccessToken>,
}

/// Sends log output to stderr, filtered by `RUST_LOG` (e.g. `RUST_LOG=netflix_api=debug`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn env(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) => value,
        Err(_) => {
            //IMPORTANT: register an app with the Netflix developer program and put its name and
            //key pair in these variables; these demos won't work without them
            eprintln!("{} is not set", name);
            std::process::exit(1);
        }
    }
}

impl Config {
    /// Builds the client from the environment, without touching any saved subscriber token.
    pub fn client(version: ApiVersion) -> Netflix {
        let client = Netflix::new(
            env("NETFLIX_APP_NAME"),
            env("NETFLIX_CONSUMER_KEY"),
            env("NETFLIX_CONSUMER_SECRET"),
        );
        match client {
            Ok(client) => client.with_version(version),
            Err(err) => {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
    }

    /// Builds the client and loads the saved subscriber token, if there is one.
    pub fn load(version: ApiVersion) -> Self {
        let client = Self::client(version);
        let token = std::fs::read_to_string(SETTINGS_FILE)
            .ok()
            .and_then(|json| serde_json::from_str::<AccessToken>(&json).ok());
        Config { client, token }
    }

    /// Walks through PIN-based authorization and saves the resulting token.
    pub async fn authorize(&mut self) -> Result<&AccessToken, Box<dyn std::error::Error>> {
        let (request_token, url) = auth::begin_authorization(&self.client, true).await?;

        println!("Go to the following URL, sign in, and give me the PIN that comes back:");
        println!("{}", url);
        print!("PIN: ");
        std::io::stdout().flush()?;

        let mut pin = String::new();
        std::io::stdin().read_line(&mut pin)?;
        println!();

        let token =
            auth::complete_authorization(&self.client, request_token, Some(pin.trim())).await?;
        std::fs::write(SETTINGS_FILE, serde_json::to_string_pretty(&token)?)?;

        Ok(self.token.insert(token))
    }

    /// Starts a session for the saved subscriber, authorizing first if there is none.
    pub async fn user(&mut self) -> Result<User, Box<dyn std::error::Error>> {
        let token = match self.token.clone() {
            Some(token) => token,
            None => self.authorize().await?.clone(),
        };
        Ok(User::new(&self.client, token)?)
    }
}
