fn main() {
    surface_protoc::init_tracing();
    std::process::exit(surface_protoc::run_cli(std::env::args()));
}
