// SPDX-License-Identifier: MIT

pub mod aggregation;
pub mod gradient;
pub mod mood;
pub mod spotify;

pub use aggregation::AggregationService;
pub use gradient::{GradientMaker, GradientSet, GradientStore};
pub use mood::MoodColorClient;
pub use spotify::SpotifyClient;
