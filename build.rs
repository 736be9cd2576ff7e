fn main() {
    // ESP-IDF environment export is only needed for the firmware binary;
    // host builds (unit + integration tests) skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
