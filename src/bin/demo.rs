use oftable::{
    kernel::{Kernel, OpenOptions, error::Error},
    report::{DescriptorTables, OpenFileList},
};

const USAGE: &str =
    "ofs-demo [--file path] [--init text] [--append1] [--append2] [--w1 text] [--w2 text]";

fn usage(status: i32) -> ! {
    if status == 0 {
        println!("{USAGE}");
    } else {
        eprintln!("{USAGE}");
    }
    std::process::exit(status);
}

enum Failure {
    Kernel(Error),
    /// A write went through while another process held the lock.
    LockIgnored,
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self::Kernel(err)
    }
}

struct Args {
    path: String,
    init: String,
    append1: bool,
    append2: bool,
    w1: String,
    w2: String,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            path: "/notes.txt".to_string(),
            init: String::new(),
            append1: false,
            append2: false,
            w1: "HELLO".to_string(),
            w2: "WORLD".to_string(),
        }
    }
}

fn parse_args() -> Args {
    let mut parsed = Args::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let target = match arg.as_str() {
            "--append1" => {
                parsed.append1 = true;
                continue;
            }
            "--append2" => {
                parsed.append2 = true;
                continue;
            }
            "--help" | "-h" => usage(0),
            "--file" => &mut parsed.path,
            "--init" => &mut parsed.init,
            "--w1" => &mut parsed.w1,
            "--w2" => &mut parsed.w2,
            _ => {
                eprintln!("ofs-demo: unknown argument {arg}");
                usage(1);
            }
        };
        match args.next() {
            Some(value) => *target = value,
            None => {
                eprintln!("ofs-demo: missing value for {arg}");
                usage(1);
            }
        }
    }
    parsed
}

fn dump(kernel: &Kernel, header: &str) {
    println!("\n{header}");
    print!("\n{}", OpenFileList(kernel));
    print!("\n{}", DescriptorTables(kernel));
}

fn run(args: &Args) -> Result<(), Failure> {
    let mut kernel = Kernel::new();
    let p1 = kernel.spawn();
    let p2 = kernel.spawn();

    let node_id = kernel.fs_mut().create_if_missing(&args.path);
    kernel.fs_mut().seed(node_id, args.init.as_bytes())?;

    let fd1 = kernel.open(p1, &args.path, OpenOptions::new().append(args.append1))?;
    let fd2 = kernel.open(p2, &args.path, OpenOptions::new().append(args.append2))?;

    kernel.write(p1, fd1, args.w1.as_bytes())?;
    kernel.write(p2, fd2, args.w2.as_bytes())?;
    dump(&kernel, "[After opens + writes]");

    let fd1_dup = kernel.dup(p1, fd1)?;
    kernel.write(p1, fd1_dup, b"++")?;
    dump(&kernel, "[After dup() + write]");

    kernel.lseek(p1, fd1, 0)?;
    let preview = kernel.read(p1, fd1_dup, 80)?;
    println!(
        "\nP1 read via dup-shared offset: {}",
        String::from_utf8_lossy(&preview)
    );

    let fd2_lock = kernel.open(p2, &args.path, OpenOptions::new().lock(true))?;
    match kernel.write(p1, fd1, b"blocked?") {
        Err(Error::WriteDenied) => println!(
            "\nExpected write denial (lock held by {p2}): {}",
            std::io::Error::from_raw_os_error(Error::WriteDenied.into())
        ),
        Err(e) => return Err(e.into()),
        Ok(_) => return Err(Failure::LockIgnored),
    }

    // Release the lock so the child may write
    kernel.close(p2, fd2_lock)?;
    println!("\nP2 closed its locked descriptor {fd2_lock}");

    let child = kernel.fork(p1)?;
    kernel.write(child, fd1, b"CHILD")?;
    dump(&kernel, "[After fork() + child write]");

    kernel.lseek(p1, fd1, 0)?;
    let parent_view = kernel.read(p1, fd1, 120)?;
    println!(
        "\nParent sees after child write: {}",
        String::from_utf8_lossy(&parent_view)
    );

    kernel.close(p1, fd1_dup)?;
    kernel.close(p1, fd1)?;
    kernel.close(p2, fd2)?;
    println!("\n[Final OFT]");
    print!("\n{}", OpenFileList(&kernel));

    Ok(())
}

fn main() {
    env_logger::init();

    let args = parse_args();
    match run(&args) {
        Ok(()) => {}
        Err(Failure::Kernel(e)) => {
            eprintln!(
                "ofs-demo: {:?}: {}",
                e,
                std::io::Error::from_raw_os_error(e.into())
            );
            std::process::exit(1);
        }
        Err(Failure::LockIgnored) => {
            eprintln!("ofs-demo: write went through despite the lock");
            std::process::exit(1);
        }
    }
}
