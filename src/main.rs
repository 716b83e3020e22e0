fn main() {
    opcode_resolver_lib::run()
}
