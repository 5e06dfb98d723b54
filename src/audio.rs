pub mod cues;
