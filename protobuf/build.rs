fn main() {
    println!("cargo:rerun-if-changed=./jobmonitor.proto");
    tonic_build::compile_protos("./jobmonitor.proto")
        .unwrap_or_else(|err| panic!("Failed to compile protos {:?}", err));
}
