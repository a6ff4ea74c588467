//! Sequence strategies
//!
//! Sequences define a deterministic or structural *order* over the grid of a
//! [`NumberSpec`]. Every sequence is implemented as an [`IndexSequence`] that walks grid
//! indices `0..count`; [`GridGenerator`] maps those indices to numbers.
//!
//! Applied to a source, a sequence materializes the source and uses the same index walk
//! to pick list positions (see [`sample_by_index`](super::sample_by_index)). The
//! streaming strategies `expand` and `head` override that and never materialize.
//!
//! # Sequences
//!
//! | name         | order over grid indices                              | unique        |
//! |--------------|------------------------------------------------------|---------------|
//! | `random`     | uniform draws                                        | permutation   |
//! | `shuffle`    | `0, k, 2k, .., 1, 1+k, ..`                           | inherent      |
//! | `cumulated`  | mean of 5 uniform draws (bell shape)                 | config error  |
//! | `randomWalk` | random steps from an initial point, wrapping         | if steps > 0  |
//! | `step`       | `0, d, 2d, ..` (from the top for negative `d`)       | if `d != 0`   |
//! | `increment`  | `0, 1, .., n-1, 0, 1, ..`                            | one pass      |
//! | `wedge`      | `0, n-1, 1, n-2, ..`                                 | inherent      |
//! | `bitreverse` | indices in bit-reversed order                        | inherent      |
//! | `expand`     | random draws from a bounded, refilled pool           | pool removal  |
//! | `fibonacci`  | Fibonacci numbers inside the range                   | skips repeats |
//! | `padovan`    | Padovan numbers inside the range                     | skips repeats |
//! | `head`       | the first `size` points                              | inherent      |

pub mod bit_reverse;
pub mod cumulated;
pub mod expand;
pub mod head;
pub mod increment;
pub mod random;
pub mod random_walk;
pub mod recurrence;
pub mod shuffle;
pub mod step;
pub mod wedge;

pub use bit_reverse::BitReverseSequence;
pub use cumulated::CumulatedSequence;
pub use expand::ExpandSequence;
pub use head::{HeadGenerator, HeadSequence};
pub use increment::IncrementSequence;
pub use random::RandomSequence;
pub use random_walk::RandomWalkSequence;
pub use recurrence::{FibonacciSequence, PadovanSequence};
pub use shuffle::ShuffleSequence;
pub use step::StepSequence;
pub use wedge::WedgeSequence;

use crate::error::Result;
use crate::generator::{Generator, GeneratorContext, GeneratorState};
use crate::value::{Number, NumberSpec};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Walk over the grid indices of a number spec
///
/// Implementations hold only the cursor state of one walk; randomness comes from the
/// RNG passed in by the owning [`GridGenerator`].
pub trait IndexSequence: Send {
    /// Start a new pass over the grid of `spec`
    fn rewind(&mut self, spec: &NumberSpec, rng: &mut Xoshiro256PlusPlus) -> Result<()>;

    /// Next grid index in `0..spec.sample_count()`, or `None` when the pass is over
    fn next_index(&mut self, rng: &mut Xoshiro256PlusPlus) -> Option<u64>;
}

/// Numeric generator driven by an index sequence
pub struct GridGenerator<S> {
    spec: NumberSpec,
    sequence: S,
    rng: Option<Xoshiro256PlusPlus>,
    state: GeneratorState,
    owner: &'static str,
}

impl<S: IndexSequence> GridGenerator<S> {
    pub fn new(owner: &'static str, spec: NumberSpec, sequence: S) -> Self {
        Self {
            spec,
            sequence,
            rng: None,
            state: GeneratorState::Created,
            owner,
        }
    }

    pub fn spec(&self) -> &NumberSpec {
        &self.spec
    }
}

impl<S: IndexSequence> Generator<Number> for GridGenerator<S> {
    fn init(&mut self, context: &GeneratorContext) -> Result<()> {
        self.state.assert_created(self.owner)?;
        self.spec.validate()?;
        let mut rng = context.new_rng();
        self.sequence.rewind(&self.spec, &mut rng)?;
        self.rng = Some(rng);
        self.state = GeneratorState::Running;
        Ok(())
    }

    fn generate(&mut self) -> Result<Option<Number>> {
        self.state.assert_running(self.owner)?;
        let rng = match self.rng.as_mut() {
            Some(rng) => rng,
            None => return Ok(None),
        };
        Ok(self.sequence.next_index(rng).map(|i| self.spec.value_at(i)))
    }

    fn reset(&mut self) -> Result<()> {
        if self.state == GeneratorState::Created {
            return self.init(&GeneratorContext::default());
        }
        self.state.assert_not_closed(self.owner)?;
        if let Some(rng) = self.rng.as_mut() {
            self.sequence.rewind(&self.spec, rng)?;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.state = GeneratorState::Closed;
    }

    fn state(&self) -> GeneratorState {
        self.state
    }
}
