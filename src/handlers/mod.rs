// handlers/mod.rs - two handler tiers
//
// Public (no auth) -> Protected (bearer JWT + directory check)
pub mod public; // GET /, GET /health
pub mod protected; // /clients/*, /projects/*
