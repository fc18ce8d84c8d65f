/// Command line entry: argument parsing and the run/sweep/optimize/template commands.
pub mod cli_main;
/// Usage text, task-document help and the case template.
pub mod bemt_help;
