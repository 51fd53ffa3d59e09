//! # API Route Modules
//!
//! - `apps` — public serving of deployed applications under `/apps/`.
//! - `admin` — Basic-auth dashboard and application CRUD under `/admin`.

pub mod admin;
pub mod apps;
