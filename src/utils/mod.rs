pub mod join_naming;
