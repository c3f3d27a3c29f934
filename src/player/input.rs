/// Decoded boolean intents for one tick.
///
/// The host fills this from whatever devices it wires up; the simulation
/// never sees raw events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    /// Walk left
    pub left: bool,
    /// Walk right
    pub right: bool,
    /// Not bound to an action; kept so hosts can map it
    pub up: bool,
    /// Starts a roll
    pub down: bool,
    /// Jump
    pub jump: bool,
    /// Alternative to `down` for starting a roll
    pub roll: bool,
    /// Attack with the first move
    pub attack1: bool,
    /// Attack with the second move
    pub attack2: bool,
    /// Attack with the third move
    pub attack3: bool,
}

impl Intents {
    #[inline]
    pub(crate) fn wants_roll(&self) -> bool {
        (self.down || self.roll) && (self.left || self.right)
    }
}
