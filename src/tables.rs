pub mod quaryfn;
