// handlers/mod.rs - HTTP handlers
//
// discovery:        GET /, GET /health (public)
// tenant_networks:  /v2.1/os-tenant-networks[/:id] (JWT + route gate)
pub mod discovery;
pub mod tenant_networks;
