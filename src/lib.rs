// data module
pub mod data {
    pub mod feature;
    pub mod identification;
    pub mod run;
}

// algorithm module
pub mod algorithm {
    pub mod consensus;
}

// error module
pub mod error;
