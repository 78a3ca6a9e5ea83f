/// Ordered keyword rules for classifying account bios.
pub mod category;

/// Credible financial commentators, from a seed list of accounts to a JSON snapshot.
pub mod influencers;

/// Social-profile API and its nested response document.
pub mod profile;
