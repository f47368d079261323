//! # deskledger-oauth
//!
//! `OAuth2` authorization for command-line tools reading Gmail.
//!
//! ## Features
//!
//! - **Installed-app flow**: Authorization Code Flow with PKCE and a
//!   loopback redirect receiver
//! - **Client secrets**: reads the `credentials.json` downloaded from the
//!   Google Cloud console
//! - **Token persistence**: saves the refresh token as an
//!   `authorized_user` file and refreshes it on later runs
//!
//! ## Quick Start
//!
//! ```ignore
//! use deskledger_oauth::{Authenticator, AuthorizeOptions, ClientSecrets, TokenStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secrets = ClientSecrets::load("credentials.json".as_ref()).await?;
//!     let store = TokenStore::new("token.json");
//!     let auth = Authenticator::new(secrets, store, AuthorizeOptions::default());
//!
//!     // Opens the browser on first run, reuses the refresh token afterwards
//!     let token = auth.authorize().await?;
//!     println!("Access token: {}", token.access_token);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod authorize;
mod error;
pub mod flow;
pub mod provider;
pub mod secrets;
pub mod store;
pub mod token;

pub use authorize::{Authenticator, AuthorizeOptions};
pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, CallbackParams, LoopbackReceiver, OAuthClient, PkceChallenge};
pub use provider::Provider;
pub use secrets::ClientSecrets;
pub use store::{AuthorizedUser, TokenStore};
pub use token::Token;
