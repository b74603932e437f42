use taskhub_auth::Actor;

/// The authenticated actor for a request.
///
/// Built by the auth middleware from the reloaded user row, so the
/// organization reflects the current state rather than the token's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}
