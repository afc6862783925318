mod tests_driver;
mod tests_errors;
mod tests_mesh_functions;
mod tests_operators;
mod tests_plugins;
mod tests_repository;
mod tests_scenarios;
