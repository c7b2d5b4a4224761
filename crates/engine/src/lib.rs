//! # Engine Crate
//!
//! Turns a taste preference into a concrete drink recipe.
//!
//! ## Components
//!
//! ### Questionnaire
//! Averages the taste contributions of the chosen answers into a
//! [`UserProfile`]. Skipped questions do not count.
//!
//! ### Profile Reconstructor
//! A tiny autoencoder (5 → 3 ReLU → 5 sigmoid) fitted on the candidate
//! ingredients. Passing the user's profile through it pulls the profile
//! towards what the available ingredients can express.
//!
//! ### Constrained Mixer
//! Minimum-norm least squares over the ingredient tastes, then
//! non-negativity, top-k selection and scaling to a total volume.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{Autoencoder, ConstrainedMixer, ProfileReconstructor};
//! use catalog::{DataSet, Pool};
//!
//! let data = DataSet::load_from_dir(Path::new("data"))?;
//! let set = data.catalog.pool(Pool::NonAlcoholic);
//!
//! let target = Autoencoder::new().reconstruct(&set.profiles(), &profile.taste)?;
//! let mix = ConstrainedMixer::default().mix(&target, &set, 3, 200.0)?;
//! println!("{}", mix.recipe);
//! ```

// Public modules
pub mod error;
pub mod traits;
pub mod lstsq;
pub mod reconstructor;
pub mod mixer;
pub mod questionnaire;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use traits::{Passthrough, ProfileReconstructor};
pub use reconstructor::{Autoencoder, AutoencoderConfig, FittedAutoencoder};
pub use mixer::{
    ConstrainedMixer, DEFAULT_VOLUME_EPSILON, Mix, MixWeights, MixerConfig, Recipe,
    ShortRecipePolicy,
};
pub use questionnaire::{build_user_profile, parse_answers, Answer, UserProfile};
