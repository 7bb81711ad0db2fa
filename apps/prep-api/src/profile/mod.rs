//! Candidate profile pipeline: admin console export + resume → personalized
//! interview-prep HTML.
//!
//! Stages, leaf-first:
//!   topics        skill→topic lookup table and matcher strategies
//!   extractor     resume section extraction
//!   admin_export  dotted-path reads over the admin export, advisory validation
//!   merger        skill union, topic mapping, derived role fields
//!   renderer      metadata + heading injection into the base template
//!   writer        output naming, backup, write
//!   pipeline      the CLI `run` flow

pub mod admin_export;
pub mod extractor;
pub mod merger;
pub mod models;
pub mod pipeline;
pub mod renderer;
pub mod topics;
pub mod writer;
