// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Authentication Module
//!
//! Password logins exchange credentials for signed tokens; every other
//! endpoint requires one.
//!
//! ## Auth Flow
//!
//! 1. Admin logs in with the configured password; engineers log in with
//!    their name, team, and (if set) their personal password
//! 2. The server issues an HS256 JWT carrying subject, role, and team
//! 3. Subsequent requests send `Authorization: Bearer <token>`
//! 4. Extractors verify the signature and expiry against the configured
//!    signing secret and enforce the required role
//!
//! ## Security
//!
//! - Tokens are signed with `JWT_SECRET`; the development placeholder is
//!   rejected at startup outside development mode
//! - Passwords are compared as SHA-256 digests
//! - Clock skew tolerance is 60 seconds

pub mod error;
pub mod extractor;
pub mod roles;
pub mod token;

pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, EngineerOrAdmin};
pub use roles::Role;
pub use token::{issue_token, verify_admin_password, verify_token, Claims};
