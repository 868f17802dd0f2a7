//! Arcfield library - audio-reactive lightning over a weighted territory map

pub mod audio;
pub mod camera;
pub mod cli;
pub mod error;
pub mod growth;
pub mod installation;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod rng;
pub mod territory;
