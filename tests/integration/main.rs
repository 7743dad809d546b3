// End-to-end checks: grammar text in, validation reports out.
mod files;
mod incremental;
mod scenarios;
