//! Delegation domain.
//!
//! A coordinator reply may embed directives such as
//! `[CODE_REQUEST: create src/app.py]`. Each recognized directive becomes a
//! [`Delegation`](entities::Delegation) to a specialist [`AgentRole`](entities::AgentRole);
//! running it yields a [`DelegationResult`](entities::DelegationResult).

pub mod entities;
pub mod parser;
