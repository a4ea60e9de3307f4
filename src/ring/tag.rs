/// External resynchronization hook. Concrete sources typically read a
/// tag register from the acquisition hardware reporting the slot it
/// last produced into.
pub trait TagSource: Send + Sync {
    fn current_tag(&self) -> u64;
}
