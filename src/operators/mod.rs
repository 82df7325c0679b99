pub mod distance_matrix;
pub mod solution;

pub mod construction;
pub mod evaluation;
pub mod host_repository;
pub mod initialisation;
pub mod mutation;
pub mod neighbour_gen;
pub mod selection;
