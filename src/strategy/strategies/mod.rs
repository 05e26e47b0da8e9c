// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in strategies.

mod computer_verification;
mod identity_removal;
mod incident_to_adjacent;
mod lazy_barrier;
mod match_algorithm;
mod standard_verification;

pub use computer_verification::ComputerVerificationStrategy;
pub use identity_removal::IdentityRemovalStrategy;
pub use incident_to_adjacent::IncidentToAdjacentStrategy;
pub use lazy_barrier::LazyBarrierStrategy;
pub use match_algorithm::MatchAlgorithmStrategy;
pub use standard_verification::StandardVerificationStrategy;
