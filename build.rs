fn main() {
    println!("cargo:rerun-if-changed=config/device.json");
    println!("cargo:rerun-if-changed=certs/root_ca.pem");

    // ESP-IDF link arguments are only needed for the firmware binary.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
