//! Tests for IR to x86-64 lowering
//!
//! Allocation policy under test (the default configuration): definitions take
//! the first unused register of `rax, rcx, rdx, rbx, rsi, rdi`; arguments
//! arrive in `rdi, rsi, rdx, rcx`; results leave in `rax`; registers are
//! reused after their value's last read.

use crate::backend::ir::{
    BinaryOp, Function, FunctionBuilder, IrInstr, Module, VirtualRegAllocator,
};
use crate::backend::x86_64::instr::X86Instr;
use crate::backend::x86_64::lower::{lower_function, lower_program};
use crate::backend::x86_64::regs::X86Reg;
use crate::backend::x86_64::sim::{Exit, Machine};
use crate::config::BackendConfig;
use crate::error::BackendError;

fn lower(func: &Function) -> Vec<X86Instr> {
    lower_function(func, &BackendConfig::default())
        .unwrap()
        .instructions
}

/// #1 = 5; return #1
fn return_five() -> Function {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("five", &mut regs);
    let r1 = b.initialize(5);
    b.ret(Some(r1));
    b.finish()
}

#[test]
fn test_initialize_then_return_in_return_register() {
    let instrs = lower(&return_five());

    assert_eq!(
        instrs,
        vec![
            X86Instr::MovRI {
                dst: X86Reg::Rax,
                imm: 5
            },
            X86Instr::Ret,
        ]
    );

    let func = lower_function(&return_five(), &BackendConfig::default()).unwrap();
    assert_eq!(
        func.machine_code().unwrap(),
        vec![0x48, 0xB8, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC3]
    );
    assert_eq!(func.assembly(), "mov rax, 5\nret");
}

#[test]
fn test_initialize_then_return_from_other_register() {
    let config = BackendConfig::new().with_allocation_order(vec![X86Reg::Rcx, X86Reg::Rbx]);
    let func = lower_function(&return_five(), &config).unwrap();

    assert_eq!(
        func.instructions,
        vec![
            X86Instr::MovRI {
                dst: X86Reg::Rcx,
                imm: 5
            },
            X86Instr::MovRR {
                dst: X86Reg::Rax,
                src: X86Reg::Rcx
            },
            X86Instr::Ret,
        ]
    );
    assert_eq!(
        func.machine_code().unwrap(),
        vec![
            0x48, 0xB9, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // mov rcx, 5
            0x48, 0x89, 0xC8, // mov rax, rcx
            0xC3,
        ]
    );
}

#[test]
fn test_two_op_add_of_literals() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("seven", &mut regs);
    let r1 = b.initialize(3);
    let r2 = b.initialize(4);
    let r3 = b.two_op(BinaryOp::from_symbol("+").unwrap(), r1, r2);
    b.ret(Some(r3));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    // #1 -> rax, #2 -> rcx, #3 -> rdx
    assert_eq!(
        func.instructions,
        vec![
            X86Instr::MovRI {
                dst: X86Reg::Rax,
                imm: 3
            },
            X86Instr::MovRI {
                dst: X86Reg::Rcx,
                imm: 4
            },
            X86Instr::MovRR {
                dst: X86Reg::Rdx,
                src: X86Reg::Rax
            },
            X86Instr::AddRR {
                dst: X86Reg::Rdx,
                src: X86Reg::Rcx
            },
            X86Instr::MovRR {
                dst: X86Reg::Rax,
                src: X86Reg::Rdx
            },
            X86Instr::Ret,
        ]
    );

    // add rdx, rcx: REX.W, opcode 01, ModR/M 11 001 010
    assert_eq!(
        func.instructions[3].machine_code().unwrap(),
        vec![0x48, 0x01, 0xCA]
    );

    let exit = Machine::new().run(&func.instructions).unwrap();
    assert_eq!(exit, Exit::Returned(7));
}

#[test]
fn test_arguments_arrive_in_abi_registers() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("add", &mut regs);
    let x = b.argument();
    let y = b.argument();
    let sum = b.two_op(BinaryOp::Add, x, y);
    b.ret(Some(sum));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    assert_eq!(func.assembly(), "mov rax, rdi\nadd rax, rsi\nret");

    let exit = Machine::new()
        .call(&func, X86Reg::ARG_REGS, &[2, 40])
        .unwrap();
    assert_eq!(exit, Exit::Returned(42));
}

#[test]
fn test_move_of_dying_source_is_elided() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("copy", &mut regs);
    let r1 = b.initialize(9);
    let r2 = b.copy(r1);
    b.ret(Some(r2));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    assert_eq!(func.assembly(), "mov rax, 9\nret");
}

#[test]
fn test_move_of_live_source_copies() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("double", &mut regs);
    let r1 = b.initialize(9);
    let r2 = b.copy(r1);
    let r3 = b.two_op(BinaryOp::Add, r1, r2);
    b.ret(Some(r3));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    assert_eq!(
        func.assembly(),
        "mov rax, 9\nmov rcx, rax\nmov rdx, rax\nadd rdx, rcx\nmov rax, rdx\nret"
    );
    assert_eq!(Machine::new().run(&func.instructions), Ok(Exit::Returned(18)));
}

#[test]
fn test_move_without_reuse_always_copies() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("copy", &mut regs);
    let r1 = b.initialize(9);
    let r2 = b.copy(r1);
    b.ret(Some(r2));

    let config = BackendConfig::new().with_reuse_dead_registers(false);
    let func = lower_function(&b.finish(), &config).unwrap();

    assert_eq!(func.assembly(), "mov rax, 9\nmov rcx, rax\nmov rax, rcx\nret");
}

#[test]
fn test_return_without_value() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("nothing", &mut regs);
    b.ret(None);

    assert_eq!(lower(&b.finish()), vec![X86Instr::Ret]);
}

#[test]
fn test_dead_registers_are_reused() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("reuse", &mut regs);
    let r1 = b.initialize(1);
    let r2 = b.two_op(BinaryOp::Add, r1, r1);
    let r3 = b.initialize(5);
    let r4 = b.two_op(BinaryOp::Sub, r2, r3);
    b.ret(Some(r4));
    let instrs = lower(&b.finish());

    // #1 dies at the add, so #3 takes rax back
    assert_eq!(
        instrs[3],
        X86Instr::MovRI {
            dst: X86Reg::Rax,
            imm: 5
        }
    );
    assert_eq!(Machine::new().run(&instrs), Ok(Exit::Returned(-3i64 as u64)));
}

#[test]
fn test_all_operations_agree_with_simulator() {
    for op in BinaryOp::ALL {
        let mut regs = VirtualRegAllocator::new();
        let mut b = FunctionBuilder::new(format!("op{}", op.symbol()), &mut regs);
        let x = b.argument();
        let y = b.argument();
        let r = b.two_op(op, x, y);
        b.ret(Some(r));
        let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

        let (a, c) = (0x1234_5678_9abc_def0u64, 0x0f0f_f0f0_0f0f_f0f0u64);
        let exit = Machine::new()
            .call(&func, X86Reg::ARG_REGS, &[a, c])
            .unwrap();
        assert_eq!(exit, Exit::Returned(op.apply(a, c)), "operation {}", op);
    }
}

#[test]
fn test_negative_literal_is_twos_complement() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("neg", &mut regs);
    let r = b.initialize(-2);
    b.ret(Some(r));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    assert_eq!(func.assembly(), "mov rax, -2\nret");
    assert_eq!(
        func.machine_code().unwrap(),
        vec![0x48, 0xB8, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xC3]
    );
}

#[test]
fn test_returned_negative_literal_fills_rax() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("minus_one", &mut regs);
    let r = b.initialize(-1);
    b.ret(Some(r));
    let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

    let mut machine = Machine::new();
    assert_eq!(machine.run(&func.instructions), Ok(Exit::Returned(u64::MAX)));
    assert_eq!(machine.get(X86Reg::Rax), 0xffff_ffff_ffff_ffff);
}

#[test]
fn test_literals_use_the_full_word() {
    for value in [1i64 << 40, i64::MIN, i64::MAX] {
        let mut regs = VirtualRegAllocator::new();
        let mut b = FunctionBuilder::new("wide", &mut regs);
        let r = b.initialize(value);
        b.ret(Some(r));
        let func = lower_function(&b.finish(), &BackendConfig::default()).unwrap();

        let mut expected = vec![0x48, 0xB8];
        expected.extend(value.to_le_bytes());
        expected.push(0xC3);
        assert_eq!(func.machine_code().unwrap(), expected);

        let exit = Machine::new().run(&func.instructions).unwrap();
        assert_eq!(exit, Exit::Returned(value as u64));
    }
}

#[test]
fn test_use_before_definition() {
    let mut regs = VirtualRegAllocator::new();
    let r1 = regs.fresh();
    let r2 = regs.fresh();

    let mut func = Function::new("bad");
    func.entry_block.append(IrInstr::TwoOp {
        op: BinaryOp::Add,
        target: r2,
        a: r1,
        b: r1,
    });

    let err = lower_function(&func, &BackendConfig::default()).unwrap_err();
    assert_eq!(
        err,
        BackendError::UseBeforeDefinition {
            function: "bad".to_string(),
            index: 0,
            vreg: "#1".to_string(),
        }
    );
}

#[test]
fn test_definition_after_use_is_rejected() {
    let mut regs = VirtualRegAllocator::new();
    let r1 = regs.fresh();

    let mut func = Function::new("late");
    func.entry_block.append(IrInstr::Return { vreg: Some(r1) });
    func.entry_block
        .append(IrInstr::Initialize { vreg: r1, value: 1 });

    assert!(matches!(
        lower_function(&func, &BackendConfig::default()),
        Err(BackendError::UseBeforeDefinition { index: 0, .. })
    ));
}

#[test]
fn test_redefinition_is_rejected() {
    let mut regs = VirtualRegAllocator::new();
    let r1 = regs.fresh();

    let mut func = Function::new("twice");
    func.entry_block
        .append(IrInstr::Initialize { vreg: r1, value: 1 });
    func.entry_block
        .append(IrInstr::Initialize { vreg: r1, value: 2 });

    assert_eq!(
        lower_function(&func, &BackendConfig::default()),
        Err(BackendError::Redefinition {
            function: "twice".to_string(),
            index: 1,
            vreg: "#1".to_string(),
        })
    );
}

#[test]
fn test_register_exhaustion_with_live_values() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("pressure", &mut regs);
    let values: Vec<_> = (0..7).map(|i| b.initialize(i)).collect();
    let mut acc = values[0];
    for &v in &values[1..] {
        acc = b.two_op(BinaryOp::Add, acc, v);
    }
    b.ret(Some(acc));

    let err = lower_function(&b.finish(), &BackendConfig::default()).unwrap_err();
    assert_eq!(
        err,
        BackendError::RegisterExhaustion {
            function: "pressure".to_string(),
            index: 6,
            vreg: "#7".to_string(),
            available: 6,
        }
    );
}

#[test]
fn test_naive_policy_never_frees() {
    let build = |regs: &mut VirtualRegAllocator| {
        let mut b = FunctionBuilder::new("unused", regs);
        for i in 0..7 {
            b.initialize(i);
        }
        b.ret(None);
        b.finish()
    };

    let mut regs = VirtualRegAllocator::new();
    let func = build(&mut regs);

    // Unread values are released immediately when reuse is on
    assert!(lower_function(&func, &BackendConfig::default()).is_ok());

    let naive = BackendConfig::new().with_reuse_dead_registers(false);
    assert!(matches!(
        lower_function(&func, &naive),
        Err(BackendError::RegisterExhaustion { index: 6, .. })
    ));
}

#[test]
fn test_too_many_arguments() {
    let mut regs = VirtualRegAllocator::new();
    let mut func = Function::new("wide");
    for _ in 0..5 {
        func.add_argument(&mut regs);
    }
    func.entry_block.append(IrInstr::Return { vreg: None });

    assert_eq!(
        lower_function(&func, &BackendConfig::default()),
        Err(BackendError::TooManyArguments {
            function: "wide".to_string(),
            count: 5,
            available: 4,
        })
    );
}

#[test]
fn test_lowering_is_deterministic() {
    let mut regs = VirtualRegAllocator::new();
    let mut b = FunctionBuilder::new("mix", &mut regs);
    let x = b.argument();
    let c = b.initialize(11);
    let p = b.two_op(BinaryOp::Mul, x, c);
    let q = b.two_op(BinaryOp::Xor, p, x);
    let r = b.copy(q);
    b.ret(Some(r));
    let func = b.finish();

    let first = lower_function(&func, &BackendConfig::default()).unwrap();
    let second = lower_function(&func, &BackendConfig::default()).unwrap();
    assert_eq!(first.machine_code().unwrap(), second.machine_code().unwrap());
    assert_eq!(first.assembly(), second.assembly());
}

#[test]
fn test_lower_program_keeps_declaration_order() {
    let mut regs = VirtualRegAllocator::new();
    let mut module = Module::new();
    for name in ["first", "second"] {
        let mut b = FunctionBuilder::new(name, &mut regs);
        b.ret(None);
        module.add_function(b.finish());
    }

    let program = lower_program(&module, &BackendConfig::default()).unwrap();
    let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_invalid_config_is_rejected_before_lowering() {
    let config = BackendConfig::new().with_allocation_order(vec![X86Reg::Rsp]);
    assert!(matches!(
        lower_function(&return_five(), &config),
        Err(BackendError::InvalidConfig { .. })
    ));
}
