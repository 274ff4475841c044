//! Compile, assemble, run.
//!
//! Every program runs twice, with and without the optional passes, and
//! must print the same thing both times.

use crate::common::assert_runs;

#[test]
fn test_recursive_fibonacci() {
    assert_runs(
        "fn fib(n: i32) -> i32 {
            if (n < 2) {
                return n;
            } else {
                return fib(n - 1) + fib(n - 2);
            }
        }

        fn main() -> i32 {
            println!(\"{}\", fib(10));
            return 0;
        }",
        "55\n",
    );
}

#[test]
fn test_while_loop_and_arithmetic() {
    assert_runs(
        "fn main() {
            let mut i: i64 = 0;
            let mut total: i64 = 0;
            while i < 5 {
                total = total + i * 2;
                i = i + 1;
            }
            println!(\"{}\", total);
            println!(\"{}\", 17 / 5);
            println!(\"{}\", 0 - 7);
            println!(\"{}\", 3 < 2);
        }",
        "20\n3\n-7\n0\n",
    );
}

#[test]
fn test_power() {
    assert_runs(
        "fn main() {
            println!(\"{}\", 2 ** 10);
            println!(\"{}\", 3 ** 0);
            let e: i64 = 3;
            println!(\"{}\", (0 - 2) ** e);
        }",
        "1024\n1\n-8\n",
    );
}

#[test]
fn test_arrays_of_structs() {
    assert_runs(
        "struct Punto { x: i64, y: i64 }

        fn main() {
            let mut nums: [i64; 5] = [1, 2, 3, 4, 5];
            let i: i64 = 2;
            let mut puntos: [Punto; 3] = [
                Punto { x: 10, y: 20 },
                Punto { x: 30, y: 40 },
                Punto { x: 50, y: 60 }
            ];

            println!(\"{}\", nums[0]);
            println!(\"{}\", nums[3]);
            nums[1] = 100;
            println!(\"{}\", nums[1]);
            println!(\"{}\", puntos[1].y);
            puntos[2].x = 999;
            println!(\"{}\", puntos[2].x);
            println!(\"{}\", nums[i]);
        }",
        "1\n4\n100\n40\n999\n3\n",
    );
}

#[test]
fn test_operator_overloading() {
    assert_runs(
        "use std::ops::Add;
        use std::ops::Sub;

        struct Punto { x: i64, y: i64 }

        impl Add for Punto {
            type Output = Punto;
            fn add(self, other: Punto) -> Punto {
                let ans: Punto = Punto { x: self.x + other.x, y: self.y + other.y };
                return ans;
            }
        }

        impl Sub for Punto {
            fn sub(self: Punto, other: Punto) -> Punto {
                Punto { x: self.x - other.x, y: self.y - other.y }
            }
        }

        fn main() {
            let p1: Punto = Punto { x: 1, y: 2 };
            let p2: Punto = Punto { x: 3, y: 4 };
            let p3: Punto = p1 + p2;
            let p4: Punto = p3 - p1;
            println!(\"{}\", p3.x);
            println!(\"{}\", p3.y);
            println!(\"{}\", p4.x);
            println!(\"{}\", (p1 + p2 + p2).y);
        }",
        "4\n6\n3\n10\n",
    );
}

#[test]
fn test_aggregate_returns() {
    assert_runs(
        "struct Punto { x: i64, y: i64 }

        fn restar(a: Punto, b: Punto) -> Punto {
            return(Punto { x: a.x - b.x, y: a.y - b.y });
        }

        fn swap() -> [i64; 2] {
            let mut a: i64 = 10;
            let mut b: i64 = 20;
            let tmp: i64 = a;
            a = b;
            b = tmp;
            return([a, b]);
        }

        fn main() {
            let p3: Punto = restar(Punto { x: 10, y: 20 }, Punto { x: 3, y: 7 });
            println!(\"{}\", p3.x);
            println!(\"{}\", p3.y);
            let arr: [i64; 2] = swap();
            println!(\"{}\", arr[0]);
            println!(\"{}\", swap()[1]);
        }",
        "7\n13\n20\n10\n",
    );
}

#[test]
fn test_aggregates_are_copied() {
    assert_runs(
        "struct P { x: i64, y: i64 }

        fn bump(p: P) -> i64 {
            p.x = p.x + 1;
            return p.x;
        }

        fn main() {
            let mut a: P = P { x: 1, y: 2 };
            let b: P = a;
            a.x = 9;
            println!(\"{}\", b.x);
            println!(\"{}\", bump(a));
            println!(\"{}\", a.x);
            a = P { y: 5 };
            println!(\"{}\", a.x);
            println!(\"{}\", a.y);
        }",
        "1\n10\n9\n0\n5\n",
    );
}

#[test]
fn test_strings() {
    assert_runs(
        "struct Mensaje { texto: String, veces: i64 }
        static SALUDO: String = \"hola\";
        static M: Mensaje = Mensaje { texto: \"global\", veces: 2 };

        fn main() {
            let m: Mensaje = Mensaje { texto: \"local\", veces: 1 };
            println!(\"{}\", SALUDO);
            println!(\"{}\", m.texto);
            println!(\"{}\", M.texto);
            println!(\"{}\", \"say \\\"hi\\\"\");
            println!(\"{}\", SALUDO);
        }",
        "hola\nlocal\nglobal\nsay \"hi\"\nhola\n",
    );
}

#[test]
fn test_globals() {
    assert_runs(
        "static mut XS: [i64; 3] = [1, 2, 3];
        static mut COUNT: i64 = 0;

        fn tick() {
            COUNT = COUNT + 1;
        }

        fn main() {
            println!(\"{}\", XS[1]);
            tick();
            tick();
            XS[2] = XS[0] + COUNT;
            println!(\"{}\", COUNT);
            println!(\"{}\", XS[2]);
        }",
        "2\n2\n3\n",
    );
}

#[test]
fn test_common_subexpressions_respect_writes() {
    assert_runs(
        "fn main() {
            let mut x: i64 = 2;
            let y: i64 = 3;
            let a: i64 = x * y;
            let b: i64 = x * y;
            x = 5;
            let c: i64 = x * y;
            println!(\"{}\", a + b);
            println!(\"{}\", c);
        }",
        "12\n15\n",
    );
}

#[test]
fn test_many_arguments() {
    assert_runs(
        "fn sum(a: i64, b: i64, c: i64, d: i64, e: i64, f: i64) -> i64 {
            return a + b + c + d + e + f;
        }

        fn main() {
            println!(\"{}\", sum(1, 2, 3, 4, 5, 6) + sum(6, 5, 4, 3, 2, 1));
        }",
        "42\n",
    );
}

#[test]
fn test_sum_of_constants() {
    assert_runs(
        "fn main() {
            let x: i64 = 2 + 3;
            println!(\"{}\", x);
        }",
        "5\n",
    );
}

#[test]
fn test_overloaded_operator_runs_every_time() {
    assert_runs(
        "struct V { x: i64 }

        impl Add for V {
            fn add(self, other: V) -> V {
                println!(\"{}\", 7);
                return V { x: self.x + other.x };
            }
        }

        fn main() {
            let a: V = V { x: 1 };
            let b: V = V { x: 2 };
            let c: V = a + b;
            let d: V = a + b;
            println!(\"{}\", d.x);
        }",
        "7\n7\n3\n",
    );
}

#[test]
fn test_overloaded_operator_writes_are_seen() {
    assert_runs(
        "static mut G: i64 = 1;
        struct V { x: i64 }

        impl Add for V {
            fn add(self, other: V) -> V {
                G = G + 10;
                return V { x: self.x + other.x };
            }
        }

        fn main() {
            let a: V = V { x: 1 };
            let b: V = V { x: 2 };
            let s: i64 = G + 1;
            let c: V = a + b;
            let t: i64 = G + 1;
            println!(\"{}\", s);
            println!(\"{}\", t);
        }",
        "2\n12\n",
    );
}

#[test]
fn test_aggregate_function_may_fall_through() {
    assert_runs(
        "fn f(n: i64) -> [i64; 2] {
            if n < 5 {
                return [1, 2];
            }
        }

        fn main() {
            let a: [i64; 2] = f(9);
            let b: [i64; 2] = f(1);
            println!(\"{}\", b[1]);
        }",
        "2\n",
    );
}

#[test]
fn test_literal_reading_its_target() {
    assert_runs(
        "struct P { x: i64, y: i64 }

        fn main() {
            let mut p: P = P { x: 1, y: 2 };
            p = P { x: p.y, y: p.x };
            println!(\"{}\", p.x);
            println!(\"{}\", p.y);
            let mut xs: [i64; 3] = [1, 2, 3];
            xs = [xs[2], xs[1], xs[0]];
            println!(\"{}\", xs[0]);
            println!(\"{}\", xs[2]);
        }",
        "2\n1\n3\n1\n",
    );
}
