pub mod episodes;
pub mod people;
pub mod shows;
pub mod videos;
