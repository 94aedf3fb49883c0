use kiln::backend::ir::{BinaryOp, FunctionBuilder, Module, VirtualRegAllocator};

/// Names accepted by [`sample_module`]
pub const SAMPLES: [&str; 4] = ["sum", "arith", "copies", "pressure"];

/// Build one of the bundled IR modules by name
pub fn sample_module(name: &str) -> Result<Module, String> {
    let mut regs = VirtualRegAllocator::new();
    let mut module = Module::new();

    match name {
        // sum(x, y) = x + y
        "sum" => {
            let mut b = FunctionBuilder::new("sum", &mut regs);
            let x = b.argument();
            let y = b.argument();
            let s = b.two_op(BinaryOp::Add, x, y);
            b.ret(Some(s));
            module.add_function(b.finish());
        }

        // ((5 + 3) * 2 - 1) ^ 0xff, then a function with no result
        "arith" => {
            let mut b = FunctionBuilder::new("arith", &mut regs);
            let five = b.initialize(5);
            let three = b.initialize(3);
            let two = b.initialize(2);
            let one = b.initialize(1);
            let mask = b.initialize(0xff);
            let sum = b.two_op(BinaryOp::Add, five, three);
            let product = b.two_op(BinaryOp::Mul, sum, two);
            let diff = b.two_op(BinaryOp::Sub, product, one);
            let result = b.two_op(BinaryOp::Xor, diff, mask);
            b.ret(Some(result));
            module.add_function(b.finish());

            let mut b = FunctionBuilder::new("nothing", &mut regs);
            b.ret(None);
            module.add_function(b.finish());
        }

        // Copies of dying values are coalesced, copies of live ones are not
        "copies" => {
            let mut b = FunctionBuilder::new("copies", &mut regs);
            let x = b.argument();
            let kept = b.copy(x);
            let doubled = b.two_op(BinaryOp::Add, kept, x);
            let moved = b.copy(doubled);
            b.ret(Some(moved));
            module.add_function(b.finish());
        }

        // Seven values live at once: exhausts the default register set
        "pressure" => {
            let mut b = FunctionBuilder::new("pressure", &mut regs);
            let values: Vec<_> = (1..=7).map(|n| b.initialize(n)).collect();
            let mut acc = values[0];
            for &value in &values[1..] {
                acc = b.two_op(BinaryOp::Or, acc, value);
            }
            b.ret(Some(acc));
            module.add_function(b.finish());
        }

        _ => {
            return Err(format!(
                "Unknown sample '{}'\n\n\
                Usage: kiln [sample] [output.bin]\n\n\
                Available samples: {}",
                name,
                SAMPLES.join(", ")
            ));
        }
    }

    Ok(module)
}
