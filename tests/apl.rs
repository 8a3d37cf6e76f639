//! Table-driven end-to-end tests
//!
//! Each case feeds one input (possibly multi-statement) to a fresh
//! runtime and compares the printed output, ignoring differences in
//! whitespace.

use std::{cell::RefCell, rc::Rc};

use aplv::{Apl, AplError, AplResult, Buffer, EcoString, PackageValue, Value};

struct Case {
    input: &'static str,
    expect: &'static str,
}

const fn c(input: &'static str, expect: &'static str) -> Case {
    Case { input, expect }
}

static CASES: &[Case] = &[
    // Basic numbers and arithmetic
    c("1", "1"),
    c("1+1", "2"),
    c("1-2", "¯1"),
    c("¯1", "¯1"),
    c("1-¯2", "3"),
    c("1a90", "0J1"),
    c("1a60+1a300", "1J0"),
    c("1J1", "1J1"),
    // Vectors
    c("1 2 3", "1 2 3"),
    c("1+1 2 3", "2 3 4"),
    c("1 2 3+¯1", "0 1 2"),
    c("1 2 3+4 5 6", "5 7 9"),
    // Parentheses and right-to-left evaluation
    c("1 2+3 4", "4 6"),
    c("(1 2)+3 4", "4 6"),
    c("1×2+3×4", "14"),
    c("1×(2+3)×4", "20"),
    c("(3×2)+3×4", "18"),
    c("3×2+3×4", "42"),
    // Comparison
    c("1 2 3 4 5 > 2", "0 0 1 1 1"),
    c("1 2 3 4 5 ≥ 3", "0 0 1 1 1"),
    c("2 4 6 8 10<6", "1 1 0 0 0"),
    c("2 4 6 8 10≤6", "1 1 1 0 0"),
    c("1 2 3 ≠ 1.1 2 3", "1 0 0"),
    c("3=3.1 3 ¯2 ¯3 3J0", "0 1 0 0 1"),
    c("2+2=2", "3"),
    c("2×1 2 3=4 2 1", "0 2 0"),
    c("-3<4", "¯1"),
    c("-1 2 3=0 2 3", "0 ¯1 ¯1"),
    // Boolean and logical
    c("0 1 0 1 ^ 0 0 1 1", "0 0 0 1"),
    c("0 1 0 1 ∧ 0 0 1 1", "0 0 0 1"),
    c("0^0 0 1 1", "0 0 0 0"),
    c("0 0 1 1∨0 1 0 1", "0 1 1 1"),
    c("1∨0 1 0 1", "1 1 1 1"),
    c("0 0 1 1⍱0 1 0 1", "1 0 0 0"),
    c("0 0 1 1⍲0 1 0 1", "1 1 1 0"),
    c("~0", "1"),
    c("~1.0", "0"),
    c("~0 1", "1 0"),
    // Least common multiple, greatest common divisor
    c("30^36", "180"),
    c("0^3", "0"),
    c("3^0", "0"),
    c("15 1 2 7 ^ 35 1 4 0", "105 1 4 0"),
    c("30∨36", "6"),
    c("15 1 2 7 ∨ 35 1 4 0", "5 1 2 7"),
    c("0∨3", "3"),
    c("3∨0", "3"),
    c("⎕PP←5 ⋄ 3^3.6", "18"),
    c("⎕PP←5 ⋄ 3∨3.6", "0.6"),
    // Multiple expressions
    c("1⋄2⋄3", "1\n2\n3"),
    c("1⋄2", "1\n2"),
    c("1 2⋄3 4", "1 2\n3 4"),
    c("X←3 ⋄ Y←4", ""),
    // Index origin
    c("⎕IO←0 ⋄ ⍳3", "0 1 2"),
    c("⎕IO", "1"),
    c("⎕IO←0 ⋄ ⎕IO", "0"),
    // Bracket indexing
    c("A←⍳6 ⋄ A[1]", "1"),
    c("A←2 3⍴⍳6 ⋄ A[1;] ⋄ ⍴A[1;]", "1 2 3\n3"),
    c("A←2 3⍴⍳6 ⋄ A[2;3]", "6"),
    c("A←2 3⍴⍳6 ⋄ A[2;2 3]", "5 6"),
    c("A←2 3⍴⍳6 ⋄ ⍴⍴A[2;3]", "0"),
    c("A←2 3 4 ⋄ A[]", "2 3 4"),
    c("⎕IO←0 ⋄ A←2 3⍴⍳6 ⋄ A[1;2]", "5"),
    c("5 6 7[2+1]", "7"),
    c("(2×⍳3)[2]", "4"),
    c("A←2 3 ⍴⍳6⋄A[A[1;1]+1;]", "4 5 6"),
    c("A←1 2 3⋄A[3]+1", "4"),
    c("A←1 2 3⋄1+A[3]", "4"),
    // Scalar primitives with axis
    c("(2 3⍴⍳6)+[2]1 2 3", "2 4 6\n5 7 9"),
    c("1 2 3 +[2] 2 3⍴⍳6", "2 4 6\n5 7 9"),
    c(
        "K←2 3⍴.1×⍳6⋄J←2 3 4⍴⍳24⋄N←J+[1 2]K⋄⍴N⋄N[1;2;3]⋄N[2;3;4]",
        "2 3 4\n7.2\n24.6",
    ),
    // Iota and reshape
    c("⍳5", "1 2 3 4 5"),
    c("⍳0", ""),
    c("⍴⍳5", "5"),
    c("⍴5", ""),
    c("⍴⍴5", "0"),
    c("⍴⍳0", "0"),
    c("⍴⍴⍳0", "1"),
    c("2 3⍴1", "1 1 1\n1 1 1"),
    c("3⍴⍳0", "0 0 0"),
    c("⍴0 2⍴⍳0", "0 2"),
    c("⍴3 0⍴⍳0", "3 0"),
    c("⍴3 0⍴3", "3 0"),
    // Where, interval index
    c("⍸1 0 1 0 0 0 0 1 0", "1 3 8"),
    c("⍸'e'='Pete'", "2 4"),
    c("⍸1=1", "1"),
    c("10 20 30⍸11 1 31 21", "1 0 3 2"),
    c("'AEIOU'⍸'DYALOG'", "1 5 1 3 4 2"),
    c("0.8 2 3.3⍸1.3 1.9 0.7 4 .6 3.2", "1 1 0 3 0 2"),
    // Enlist, membership
    c("∊⍴⍳0", "0"),
    c("⍴∊⍴⍳0", "1"),
    c("∊2 3⍴⍳6", "1 2 3 4 5 6"),
    c("'BANANA'∊'AN'", "0 1 1 1 1 1"),
    c("5 1 2∊6 5 4 1 9", "1 1 0"),
    c("(2 3⍴8 3 5 8 4 8)∊1 8 9 3", "1 1 0\n1 0 1"),
    c("8 9 7 3∊⍳0", "0 0 0 0"),
    c("3.1 5.1 7.1∊2 2⍴1.1 3.1 5.1 4.1", "1 1 0"),
    c("19∊'CLUB'", "0"),
    c("'BE'∊'BOF'", "1 0"),
    c("'NADA'∊⍳0", "0 0 0 0"),
    c("(⌈/⍳0)∊⌊/⍳0", "0"),
    c("5 10 15∊⍳10", "1 1 0"),
    // Without
    c("1 2 3 4 5~2 3 4", "1 5"),
    c("'RHYME'~'MYTH'", "R E"),
    c("1 2~⍳0", "1 2"),
    c("1~3", "1"),
    c("3~3", ""),
    c("⍴⍳0~1 2", "0"),
    c("5 10 15~⍳10", "15"),
    c("3 1 4 1 5 5~3 1 4 1 5 5~4 2 5 2 6", "4 5 5"),
    // Unique, union
    c("∪3", "3"),
    c("⍴∪3", "1"),
    c("∪ 22 10 22 22 21 10 5 10", "22 10 21 5"),
    c("∪2 7 1 8 2 8 1 8 2 8 4 5 9 0 4 4 9", "2 7 1 8 4 5 9 0"),
    c("∪'MISSISSIPPI'", "M I S P"),
    c("⍴∪⍳0", "0"),
    c("∪⍳0", ""),
    c("3∪3", "3"),
    c("⍴3∪3", "1"),
    c("3∪⍳0", "3"),
    c("(⍳0)∪3", "3"),
    c("⍴(⍳0)∪⍳0", "0"),
    c("1 2 3∪5 3 2 1 4", "1 2 3 5 4"),
    c("5 6 7∪1 2 3", "5 6 7 1 2 3"),
    // Find
    c("'AN'⍷'BANANA'", "0 1 0 1 0 0"),
    c("'ANA'⍷'BANANA'", "0 1 0 1 0 0"),
    c("(2 2⍴1)⍷1 2 3", "0 0 0"),
    c("(2 2⍴5 6 8 9)⍷3 3⍴⍳9", "0 0 0\n0 1 0\n0 0 0"),
    c("4 5 6⍷3 3⍴⍳9", "0 0 0\n1 0 0\n0 0 0"),
    // Magnitude, residue, floor, ceiling, min, max
    c("⎕PP←5 ⋄ |1 ¯2 ¯3.2 2.2a20", "1 2 3.2 2.2"),
    c("3 3 ¯3 ¯3|¯5 5 ¯4 4", "1 2 ¯1 ¯2"),
    c("⎕PP←5 ⋄ 0.5|3.12 ¯1 ¯0.6", "0.12 0 0.4"),
    c("⎕PP←5 ⋄ ¯1 0 1|¯5.25 0 2.41", "¯0.25 0 0.41"),
    c("1j2|2j3 3j4 5j6", "1J1 ¯1J1 0J1"),
    c("4J6|7J10", "3J4"),
    c("⎕PP←5 ⋄ ¯10 7J10 .3|17 5 10", "¯3 ¯5J7 0.1"),
    c("⌊¯2.3 0.1 100 3.3", "¯3 0 100 3"),
    c("⌊0.5 + 0.4 0.5 0.6", "0 1 1"),
    c("⌊1j3.2 3.3j2.5 ¯3.3j¯2.5", "1J3 3J2 ¯3J¯3"),
    c("⌊1.5J2.5", "2J2"),
    c("⌊1J2 1.2J2.5 ¯1.2J¯2.5", "1J2 1J2 ¯1J¯3"),
    c("⌈¯2.7 3 .5", "¯2 3 1"),
    c("⌈1.5J2.5", "1J3"),
    c("⌈1J2 1.2J2.5 ¯1.2J¯2.5", "1J2 1J3 ¯1J¯2"),
    c("⌈¯2.3 0.1 100 3.3", "¯2 1 100 4"),
    c("⌈1.2j2.5 1.2j¯2.5", "1J3 1J¯2"),
    c("5⌊4 5 7", "4 5 5"),
    c("¯2⌊¯3", "¯3"),
    c("3.3 0 ¯6.7⌊3.1 ¯4 ¯5", "3.1 ¯4 ¯6.7"),
    c("¯2.1 0.1 15.3 ⌊ ¯3.2 1 22", "¯3.2 0.1 15.3"),
    c("5⌈4 5 7", "5 5 7"),
    c("¯2⌈¯3", "¯2"),
    c("3.3 0 ¯6.7⌈3.1 ¯4 ¯5", "3.3 0 ¯5"),
    c("¯2.01 0.1 15.3 ⌈ ¯3.2 ¯1.1 22.7", "¯2.01 0.1 22.7"),
    // Factorial, gamma, binomial
    c("!4", "24"),
    c("!1 2 3 4 5", "1 2 6 24 120"),
    c("⎕PP←5 ⋄ !3J2", "¯3.0115J1.7702"),
    c("⎕PP←5 ⋄ !.5 ¯.05", "0.88623 1.0315"),
    c("2!5", "10"),
    c("⎕PP←5 ⋄ 3.2!5.2", "10.92"),
    c("3!¯2", "¯4"),
    c("¯6!¯3", "¯10"),
    c("2 3 4!6 18 24", "15 816 10626"),
    c("⎕PP←5 ⋄ 3!.05 2.5 ¯3.6", "0.015437 0.3125 ¯15.456"),
    c("0 1 2 3!3", "1 3 3 1"),
    c("2!3J2", "1J5"),
    // Match, not match, tally, depth
    c("≡5", "0"),
    c("≡⍳0", "1"),
    c("≡\"alpha\"", "0"),
    c("≢2 3 4⍴⍳10", "2"),
    c("≢2", "1"),
    c("≢⍳0", "0"),
    c("1 2 3≡1 2 3", "1"),
    c("3≡1⍴3", "0"),
    c("\"\"≡⍳0", "0"),
    c("''≡⍳0", "1"),
    c("2.0-1.0≡1>0", "1"),
    c("1≢2", "1"),
    c("1≢1", "0"),
    c("3≢1⍴3", "1"),
    c("\"\"≢⍳0", "1"),
    // Left tack, right tack
    c("⊣1 2 3", "1 2 3"),
    c("3 2 1⊣1 2 3", "3 2 1"),
    c("1 2 3⊢3 2 1", "3 2 1"),
    c("⊢4", "4"),
    c("⊣/1 2 3", "1"),
    c("⊢/1 2 3", "3"),
    c("⊣/2 3⍴⍳6", "1 4"),
    c("⊢/2 3⍴⍳6", "3 6"),
    // Array expressions
    c("-⍳3", "¯1 ¯2 ¯3"),
    // Ravel, catenate
    c(",2 3⍴⍳6", "1 2 3 4 5 6"),
    c("⍴,3", "1"),
    c("⍴,⍳0", "0"),
    c("1 2 3,4 5 6", "1 2 3 4 5 6"),
    c("\"abc\",1 2", "abc 1 2"),
    c("(2 3⍴⍳6),2 2⍴7 8 9 10", "1 2 3 7 8\n4 5 6 9 10"),
    c("2 3≡2,3", "1"),
    c("(1 2 3,4 5 6)≡⍳6", "1"),
    c("0,2 3⍴1", "0 1 1 1\n0 1 1 1"),
    c("0,[1]2 3⍴⍳6", "0 0 0\n1 2 3\n4 5 6"),
    c("(2 3⍴⍳6),[1]0", "1 2 3\n4 5 6\n0 0 0"),
    c("(2 3⍴⍳6),[1]5 4 3", "1 2 3\n4 5 6\n5 4 3"),
    c("⍴(3 5⍴⍳15),[1]3 3 5⍴-⍳45", "4 3 5"),
    c("⍴(3 5⍴⍳15),[2]3 3 5⍴-⍳45", "3 4 5"),
    // Ravel with axis
    c(",[0.5]1 2 3", "1 2 3"),
    c("⍴,[0.5]1 2 3", "1 3"),
    c(",[1.5]1 2 3", "1\n2\n3"),
    c("⍴,[1.5]1 2 3", "3 1"),
    c("A←3 4⍴⍳12⋄⍴,[0.5]A", "1 3 4"),
    c("A←3 4⍴⍳12⋄⍴,[1.5]A", "3 1 4"),
    c("A←3 4⍴⍳12⋄⍴,[2.5]A", "3 4 1"),
    c("A←2 3⍴⍳6⋄⍴,[.1]A", "1 2 3"),
    c("A←2 3⍴⍳6⋄⍴,[1.1]A", "2 1 3"),
    c("A←2 3⍴⍳6⋄⍴,[2.1]A", "2 3 1"),
    c(",[1.1]5 6 7", "5\n6\n7"),
    c("A←2 3 4⍴⍳24⋄A←,[1 2]A⋄⍴A⋄A[5;3]", "6 4\n19"),
    c("A←2 3 4⍴⍳24⋄⍴,[2 3]A", "2 12"),
    c("A←3 2 4⍴⍳24⋄⍴,[2 3]A", "3 8"),
    c("A←3 2 4⍴⍳24⋄⍴,[1 2]A", "6 4"),
    c("⍴,[⍳0]1 2 3", "3 1"),
    c("⍴,[⍳0]2 3⍴⍳6", "2 3 1"),
    c("A←3 2 5⍴⍳30⋄⍴,[⍳⍴⍴A],[.5]A", "6 5"),
    c(
        "A←2 3 4⍴⍳24⋄(,[2 3]A)←2 12⍴-⍳24⋄⍴A⋄A[1;3;4]",
        "2 3 4\n¯12",
    ),
    // Laminate
    c("1 2 3,[0.5]4", "1 2 3\n4 4 4"),
    c("1 2 3,[1.5]4", "1 4\n2 4\n3 4"),
    c("⎕IO←0⋄1 2 3,[¯0.5]4", "1 2 3\n4 4 4"),
    c("'FOR',[.5]'AXE'", "F O R\nA X E"),
    c("'FOR',[1.1]'AXE'", "F A\nO X\nR E"),
    // Table, catenate first
    c("⍪0", "0"),
    c("⍴⍪0", "1 1"),
    c("⍪⍳4", "1\n2\n3\n4"),
    c("⍪2 2⍴⍳4", "1 2\n3 4"),
    c("⍪2 2 2⍴⍳8", "1 2 3 4\n5 6 7 8"),
    c("10 20⍪2 2⍴⍳4", "10 20\n1 2\n3 4"),
    // Decode
    c("3⊥1 2 1", "16"),
    c("3⊥4 3 2 1", "142"),
    c("2⊥1 1 1 1", "15"),
    c("1 2 3⊥3 2 1", "25"),
    c("1J1⊥1 2 3 4", "5J9"),
    c("24 60 60⊥2 23 12", "8592"),
    c("(2 1⍴2 10)⊥3 2⍴ 1 4 0 3 1 2", "5 24\n101 432"),
    // Encode
    c("2 2 2 2⊤15", "1 1 1 1"),
    c("10⊤5 15 125", "5 5 5"),
    c("⍴10⊤5 15 125", "3"),
    c("⍴(1 1⍴10)⊤5 15 125", "1 1 3"),
    c("0 10⊤5 15 125", "0 1 12\n5 5 5"),
    c("0 1⊤1.25 10.5", "1 10\n0.25 0.5"),
    c("24 60 60⊤8592", "2 23 12"),
    c("2 2 2 2 2⊤15", "0 1 1 1 1"),
    c("2 2 2⊤15", "1 1 1"),
    c("4 5 6⊤⍳0", ""),
    c("⍴4 5 6⊤⍳0", "3 0"),
    c("⍴(⍳0)⊤4 5 6", "0 3"),
    c("((⌊1+2⍟135)⍴2)⊤135", "1 0 0 0 0 1 1 1"),
    c("24 60 60⊤162507", "21 8 27"),
    c("0 24 60 60⊤162507", "1 21 8 27"),
    c("10 10 10⊤215 345 7", "2 3 0\n1 4 0\n5 5 7"),
    c("(4 2⍴8 2)⊤15", "0 1\n0 1\n1 1\n7 1"),
    c("3 2J3⊤2", "0J2 ¯1J2"),
    c("3 2J3⊤2 1", "0J2 0J2\n¯1J2 ¯2J2"),
    c("10⊥2 2 2 2⊤15", "1111"),
    c("10 10 10⊤123", "1 2 3"),
    c("10 10 10⊤123 456", "1 4\n2 5\n3 6"),
    c("2 2 2⊤¯1", "1 1 1"),
    c("0 2 2⊤¯1", "¯1 1 1"),
    c("0 1⊤3.75 ¯3.75", "3 ¯4\n0.75 0.25"),
    c("1 0⊤0", "0 0"),
    c("0⊤0", "0"),
    c("0⊤0 0", "0 0"),
    c("0 0⊤0", "0 0"),
    c("1 0⊤234", "0 234"),
    // Reduce, reduce first, reduce with axis
    c("+/1 2 3", "6"),
    c("+⌿1 2 3", "6"),
    c("+/2 3 1 ⍴⍳6", "1 2 3\n4 5 6"),
    c("⍴+/3", ""),
    c("⍴+/1 1⍴3", "1"),
    c("+/2 3⍴⍳6", "6 15"),
    c("+⌿2 3⍴⍳6", "5 7 9"),
    c("+/⍳0", "0"),
    c("+/[1]2 3⍴⍳6", "5 7 9"),
    c("+/[1]3 4⍴⍳12", "15 18 21 24"),
    c("+/[2]3 4⍴⍳12", "10 26 42"),
    c("×/[1]3 4 ⍴⍳12", "45 120 231 384"),
    c("÷/[2]2 1 4⍴2×⍳8", "2 4 6 8\n10 12 14 16"),
    c("÷/[2]2 0 3⍴0", "1 1 1\n1 1 1"),
    // N-wise reduction
    c("6+/⍳6", "21"),
    c("4+/⍳6", "10 14 18"),
    c("5+/⍳6", "15 20"),
    c("3+/⍳6", "6 9 12 15"),
    c("1+/⍳6", "1 2 3 4 5 6"),
    c("0+/⍳0", "0"),
    c("⍴0+/⍳0", "1"),
    c("1+/⍳0", ""),
    c("¯1+/⍳0", ""),
    c("⍴4+/2 3⍴⍳6", "2 0"),
    c("2+/3 4⍴⍳12", "3 5 7\n11 13 15\n19 21 23"),
    c("¯2-/1 4 9 16 25", "3 5 7 9"),
    c("2-/1 4 9 16 25", "¯3 ¯5 ¯7 ¯9"),
    c("3×/⍳6", "6 24 60 120"),
    c("¯3×/⍳6", "6 24 60 120"),
    c("0×/⍳5", "1 1 1 1 1 1"),
    c("4+/[1]4 3⍴⍳12", "22 26 30"),
    c("3+/[1]4 3⍴⍳12", "12 15 18\n21 24 27"),
    c("2+/[1]4 3⍴⍳12", "5 7 9\n11 13 15\n17 19 21"),
    c("0×/[1]2 3⍴⍳12", "1 1 1\n1 1 1\n1 1 1"),
    c("+/1000+/⍳10000", "45009500500"),
    // Scan, scan first, scan with axis
    c("+\\1 2 3 4 5", "1 3 6 10 15"),
    c("+\\2 3⍴⍳6", "1 3 6\n4 9 15"),
    c("+⍀2 3⍴⍳6", "1 2 3\n5 7 9"),
    c("-\\1 2 3", "1 ¯1 2"),
    c("∨/0 0 1 0 0 1 0", "1"),
    c("^\\1 1 1 0 1 1 1", "1 1 1 0 0 0 0"),
    c("+\\[1]2 3⍴⍳6", "1 2 3\n5 7 9"),
    // Replicate, compress
    c("1 1 0 0 1/'STRAY'", "S T Y"),
    c("1 0 1 0/3 4⍴⍳12", "1 3\n5 7\n9 11"),
    c("1 0 1/1 2 3", "1 3"),
    c("1/1 2 3", "1 2 3"),
    c("3 2 1/1 2 3", "1 1 1 2 2 3"),
    c("1 0 1/2", "2 2"),
    c("⍴1/1", "1"),
    c("⍴⍴(,1)/2", "1"),
    c("3 4/1 2", "1 1 1 2 2 2 2"),
    c("1 0 1 0 1/⍳5", "1 3 5"),
    c("1 ¯2 3 ¯4 5/⍳5", "1 0 0 3 3 3 0 0 0 0 5 5 5 5 5"),
    c("2 0 1/2 3⍴⍳6", "1 1 3\n4 4 6"),
    c("0 1⌿2 3⍴⍳6", "4 5 6"),
    c("0 1⌿⍴⍳6", "6"),
    c("1 0 1/4", "4 4"),
    c("1 0 1/,3", "3 3"),
    c("1 0 1/1 1⍴5", "5 5"),
    c("A←2 ¯1 1/[1]3 2 4⍴⍳24⋄⍴A⋄+/+/A", "4 2 4\n36 36 0 164"),
    c("⍴2/[2]3 2 4⍴⍳24", "3 4 4"),
    c("⍴¯1 1/[2]3 1 4⍴⍳12", "3 2 4"),
    c("0 1/[1]2 3⍴⍳6", "4 5 6"),
    c("B←2 2⍴'ABCD'⋄A←3 2⍴⍳6⋄(1 0 1/[1]A)←B⋄A", "A B\n3 4\nC D"),
    // Expand, expand first
    c("1 0 1 0 0 1\\1 2 3", "1 0 2 0 0 3"),
    c("1 0 0\\5", "5 0 0"),
    c("0 1 0\\3 1⍴7 8 9", "0 7 0\n0 8 0\n0 9 0"),
    c("1 0 0 1 0 1\\7 8 9", "7 0 0 8 0 9"),
    c("⍴(⍳0)\\3", "0"),
    c("⍴(⍳0)\\2 0⍴3", "2 0"),
    c("⍴1 0 1\\0 2⍴0", "0 3"),
    c("0 0 0\\2 0⍴0", "0 0 0\n0 0 0"),
    c("1 0 1⍀2 3⍴⍳6", "1 2 3\n0 0 0\n4 5 6"),
    c("0\\⍳0", "0"),
    c("1 ¯2 3 ¯4 5\\3", "3 0 0 3 3 3 0 0 0 0 3 3 3 3 3"),
    c("1 0 1\\1 3", "1 0 3"),
    c("1 0 1\\2", "2 0 2"),
    c("1 0 1 1\\1 2 3", "1 0 2 3"),
    c("1 0 1 1⍀3", "3 0 3 3"),
    c("0 1\\3 1⍴3 2 4", "0 3\n0 2\n0 4"),
    c("0 0\\5", "0 0"),
    c("1 0 1\\3 2⍴⍳6", "1 0 2\n3 0 4\n5 0 6"),
    c("1 0 1 1\\2 3⍴⍳6", "1 0 2 3\n4 0 5 6"),
    c("1 0 1\\[1]2 3⍴⍳6", "1 2 3\n0 0 0\n4 5 6"),
    // Pi times, circular, trigonometric
    c("⎕PP←5 ⋄ ○0 1 2", "0 3.1416 6.2832"),
    c("⎕PP←5 ⋄ 0 ¯1 ○ 1", "0 1.5708"),
    c("⎕PP←5 ⋄ 1○(○1)÷2 3 4", "1 0.86603 0.70711"),
    c("⎕PP←5 ⋄ 2○(○1)÷3", "0.5"),
    c("9 11○3.5J¯1.2", "3.5 ¯1.2"),
    c("9 11∘.○3.5J¯1.2 2J3 3J4", "3.5 2 3\n¯1.2 3 4"),
    c("¯4○¯1", "0"),
    c("⎕PP←5 ⋄ 3○2", "¯2.185"),
    c("⎕PP←5 ⋄ 2○1", "0.5403"),
    c("⎕PP←5 ⋄ ÷3○2", "¯0.45766"),
    c("⎕PP←5 ⋄ 1○○30÷180", "0.5"),
    c("⎕PP←5 ⋄ 2○○45÷180", "0.70711"),
    c("⎕PP←5 ⋄ ¯1○1", "1.5708"),
    c("⎕PP←5 ⋄ ¯2○.54032023059", "0.99998"),
    c("⎕PP←5 ⋄ (¯1○.5)×180÷○1", "30"),
    c("⎕PP←5 ⋄ (¯3○1)×180÷○1", "45"),
    c("⎕PP←5 ⋄ 5○1", "1.1752"),
    c("⎕PP←5 ⋄ 6○1", "1.5431"),
    c("⎕PP←5 ⋄ ¯5○1.175201194", "1"),
    c("⎕PP←5 ⋄ ¯6○1.543080635", "1"),
    // Take, drop
    c("5↑'ABCDEF'", "A B C D E"),
    c("5↑1 2 3", "1 2 3 0 0"),
    c("¯5↑1 2 3", "0 0 1 2 3"),
    c("2 3↑2 4⍴⍳8", "1 2 3\n5 6 7"),
    c("¯1 ¯2↑2 4⍴⍳8", "7 8"),
    c("1↑2", "2"),
    c("⍴1↑2", "1"),
    c("1 1 1↑2", "2"),
    c("⍴1 1 1↑2", "1 1 1"),
    c("(⍳0)↑2", "2"),
    c("⍴(⍳0)↑2", ""),
    c("2↑⍳0", "0 0"),
    c("2 3↑2", "2 0 0\n0 0 0"),
    c("4↓'OVERBOARD'", "B O A R D"),
    c("¯5↓'OVERBOARD'", "O V E R"),
    c("⍴10↓'OVERBOARD'", "0"),
    c("0 ¯2↓3 3⍴⍳9", "1\n4\n7"),
    c("¯2 ¯1↓3 3⍴⍳9", "1 2"),
    c("1↓3 3⍴⍳9", "4 5 6\n7 8 9"),
    c("1 1↓2 3 4⍴⍳24", "17 18 19 20\n21 22 23 24"),
    c("¯1 ¯1↓2 3 4⍴⍳24", "1 2 3 4\n5 6 7 8"),
    c("3↓12 31 45 10 57", "10 57"),
    c("¯3↓12 31 45 10 57", "12 31"),
    c("0 2↓3 5⍴⍳15", "3 4 5\n8 9 10\n13 14 15"),
    c("⍴3 1↓2 3⍴'ABCDEF'", "0 2"),
    c("⍴2 3↓2 3⍴'ABCDEF'", "0 0"),
    c("0↓4", "4"),
    c("⍴0↓4", "1"),
    c("0 0 0↓4", "4"),
    c("⍴0 0 0↓4", "1 1 1"),
    c("⍴1↓5", "0"),
    c("⍴0↓5", "1"),
    c("⍴1 2 3↓4", "0 0 0"),
    c("''↓5", "5"),
    c("⍴⍴''↓5", "0"),
    c("1↑2 3⍴⍳6", "1 2 3"),
    c("1↑[1]2 3⍴⍳6", "1 2 3"),
    c("1 3↑[1 2]2 3⍴⍳6", "1 2 3"),
    c("2↑[1]3 5⍴'GIANTSTORETRAIL'", "G I A N T\nS T O R E"),
    c("¯3↑[2]3 5⍴'GIANTSTORETRAIL'", "A N T\nO R E\nA I L"),
    c("3↑[1]2 3⍴⍳6", "1 2 3\n4 5 6\n0 0 0"),
    c("¯4↑[1]2 3⍴⍳6", "0 0 0\n0 0 0\n1 2 3\n4 5 6"),
    c(
        "2↑[2]2 3 4⍴⍳24",
        "1 2 3 4\n5 6 7 8\n\n13 14 15 16\n17 18 19 20",
    ),
    c(
        "2↑[3]2 3 4⍴⍳24",
        "1 2\n5 6\n9 10\n\n13 14\n17 18\n21 22",
    ),
    c("2 ¯2↑[3 2]2 3 4⍴⍳24", "5 6\n9 10\n\n17 18\n21 22"),
    c("2 ¯2↑[2 3]2 3 4⍴⍳24", "3 4\n7 8\n\n15 16\n19 20"),
    c("1↓[1]3 4⍴'FOLDBEATRODE'", "B E A T\nR O D E"),
    c("1↓[2]3 4⍴'FOLDBEATRODE'", "O L D\nE A T\nO D E"),
    c("A←3 4⍴'FOLDBEATRODE'⋄(1↓[1]A)≡1 0↓A", "1"),
    c("A←3 4⍴'FOLDBEATRODE'⋄(1↓[2]A)≡0 1↓A", "1"),
    c("A←3 2 4⍴⍳24⋄1 ¯1↓[2 3]A", "5 6 7\n\n13 14 15\n\n21 22 23"),
    c("A←3 2 4⍴⍳24⋄1 ¯1↓[3 2]A", "2 3 4\n\n10 11 12\n\n18 19 20"),
    c("A←2 3 4⍴⍳24⋄⍴1↓[2]A", "2 2 4"),
    c(
        "A←2 3 4⍴⍳24⋄2↓[3]A",
        "3 4\n7 8\n11 12\n\n15 16\n19 20\n23 24",
    ),
    c("A←2 3 4⍴⍳24⋄2 1↓[3 2]A", "7 8\n11 12\n\n19 20\n23 24"),
    // Format, execute
    c("⍕10", "10"),
    c("⍎\"1+1\"", "2"),
    // Grade up, grade down, sort
    c("⍋23 11 13 31 12", "2 5 3 1 4"),
    c("⍋23 14 23 12 14", "4 2 5 1 3"),
    c("⍋5 3⍴4 16 37 2 9 26 5 11 63 3 18 45 5 11 54", "2 4 1 5 3"),
    c("⍋22.5 1 15 3 ¯4", "5 2 4 3 1"),
    c("⍒33 11 44 66 22", "4 3 1 5 2"),
    c("⍋'alpha'", "1 5 4 2 3"),
    c("'ABCDE'⍒'BEAD'", "2 4 1 3"),
    c("A←23 11 13 31 12⋄A[⍋A]", "11 12 13 23 31"),
    // Reverse, reverse first
    c("⌽1 2 3 4 5", "5 4 3 2 1"),
    c("⌽2 3⍴⍳6", "3 2 1\n6 5 4"),
    c("⊖2 3⍴⍳6", "4 5 6\n1 2 3"),
    c("⌽[1]2 3⍴⍳6", "4 5 6\n1 2 3"),
    c("⊖[2]2 3⍴⍳6", "3 2 1\n6 5 4"),
    c("A←2 3⍴⍳12 ⋄ (⌽[1]A)←2 3⍴-⍳6⋄A", "¯4 ¯5 ¯6\n¯1 ¯2 ¯3"),
    c("⌽'DESSERTS'", "S T R E S S E D"),
    // Rotate
    c("1⌽1 2 3 4", "2 3 4 1"),
    c("10⌽1 2 3 4", "3 4 1 2"),
    c("¯1⌽1 2 3 4", "4 1 2 3"),
    c("(-7)⌽1 2 3 4", "2 3 4 1"),
    c("1 2⌽2 3⍴⍳6", "2 3 1\n6 4 5"),
    c(
        "(2 2⍴2 ¯3 3 ¯2)⌽2 2 4⍴⍳16",
        "3 4 1 2\n6 7 8 5\n\n12 9 10 11\n15 16 13 14",
    ),
    c(
        "(2 3⍴2 ¯3 3 ¯2 1 2)⊖2 2 3⍴⍳12",
        "1 8 9\n4 11 6\n\n7 2 3\n10 5 12",
    ),
    c(
        "(2 4⍴0 1 ¯1 0 0 3 2 1)⌽[2]2 2 4⍴⍳16",
        "1 6 7 4\n5 2 3 8\n\n9 14 11 16\n13 10 15 12",
    ),
    c(
        "A←3 4⍴⍳12⋄(1 ¯1 2 ¯2⌽[1]A)←3 4⍴'ABCDEFGHIJKL'⋄A",
        "I F G L\nA J K D\nE B C H",
    ),
    // Transpose
    c("1 2 1⍉2 3 4⍴⍳6", "1 5 3\n2 6 4"),
    c("⍉3 1⍴1 2 3", "1 2 3"),
    c("⍴⍉2 3⍴⍳6", "3 2"),
    c("+/+/1 3 2⍉2 3 4⍴⍳24", "78 222"),
    c("+/+/3 2 1⍉2 3 4⍴⍳24", "66 72 78 84"),
    c("+/+/2 1 3⍉2 3 4⍴⍳24", "68 100 132"),
    c("1 1 1⍉2 3 3⍴⍳18", "1 14"),
    c("1 1 1⍉2 3 4⍴'ABCDEFGHIJKL',⍳12", "A 6"),
    c("1 1 2⍉2 3 4⍴'ABCDEFGHIJKL',⍳12", "A B C D\n5 6 7 8"),
    c("2 2 1⍉2 3 4⍴'ABCDEFGHIJKL',⍳12", "A 5\nB 6\nC 7\nD 8"),
    c("1 2 2⍉2 3 4⍴'ABCDEFGHIJKL',⍳12", "A F K\n1 6 11"),
    c("1 2 1⍉2 3 4⍴'ABCDEFGHIJKL',⍳12", "A E I\n2 6 10"),
    c("⍴⍴(⍳0)⍉5", "0"),
    c("⍴2 1 3⍉3 2 4⍴⍳24", "2 3 4"),
    c("⎕IO←0⋄⍴1 0 2⍉3 2 4⍴⍳24", "2 3 4"),
    c("A←3 3⍴⍳9⋄(1 1⍉A)←10 20 30⋄A", "10 2 3\n4 20 6\n7 8 30"),
    // Domino, solve linear system
    c("⌹2 2⍴2 0 0 1", "0.5 0\n0 1"),
    c(
        "⎕PP←5 ⋄ (1 ¯2 0)⌹3 3⍴3 2 ¯1 2 ¯2 4 ¯1 .5 ¯1",
        "1 ¯2 ¯2",
    ),
    c("(2 2⍴2 0 0 1)⌹2 2⍴2 0 0 1", "1 0\n0 1"),
    // Basic operators
    c("1 2 3 +.× 4 3 2", "16"),
    c("(2 3⍴⍳6) +.× 3 2⍴5+⍳6", "52 58\n124 139"),
    c("-\\×\\+\\1 2 3", "1 ¯2 16"),
    c("+/+/+/+/1 2 3", "6"),
    c("+.×/2 3 4", "24"),
    c("+.*.×/2 3 4", "24"),
    // Identity items for reduction over an empty array
    c("-/⍳0", "0"),
    c("×/⍳0", "1"),
    c("÷/⍳0", "1"),
    c("|/⍳0", "0"),
    c("⌊/⍳0", "1.7976931348623157e308"),
    c("⌈/⍳0", "¯1.7976931348623157e308"),
    c("*/⍳0", "1"),
    c("!/⍳0", "1"),
    c("^/⍳0", "1"),
    c("∧/⍳0", "1"),
    c("∨/⍳0", "0"),
    c("</⍳0", "0"),
    c("≤/⍳0", "1"),
    c("=/⍳0", "1"),
    c("≥/⍳0", "1"),
    c(">/⍳0", "0"),
    c("≠/⍳0", "0"),
    c("⊤/⍳0", "0"),
    c("⌽/⍳0", "0"),
    c("⊖/⍳0", "0"),
    c("∨/0 3⍴ 1", ""),
    c("∨/3 3⍴ ⍳0", "0 0 0"),
    c("∪/⍳0", "0"),
    // Outer product
    c("10 20 30∘.+1 2 3", "11 12 13\n21 22 23\n31 32 33"),
    c("(⍳3)∘.=⍳3", "1 0 0\n0 1 0\n0 0 1"),
    c("1 2 3∘.×4 5 6", "4 5 6\n8 10 12\n12 15 18"),
    // Each
    c("-¨1 2 3", "¯1 ¯2 ¯3"),
    c("1+¨1 2 3", "2 3 4"),
    c("1 2 3+¨1", "2 3 4"),
    c("1 2 3+¨4 5 6", "5 7 9"),
    c("1+¨1", "2"),
    // Commute, duplicate
    c("∘.≤⍨1 2 3", "1 1 1\n0 1 1\n0 0 1"),
    c("+/∘(÷∘⍴⍨)⍳10", "5.5"),
    c("⍴⍨3", "3 3 3"),
    c("3-⍨4", "1"),
    c("+/2*⍨2 2⍴4 7 1 8", "65 65"),
    // Composition
    c("+/∘⍳¨2 4 6", "3 10 21"),
    c("⎕PP←5 ⋄ 1∘○ 10 20 30", "¯0.54402 0.91295 ¯0.98803"),
    c("⎕PP←5 ⋄ +∘÷/40⍴1", "1.618"),
    c("(*∘0.5)4 16 25", "2 4 5"),
    // Power operator
    c("⎕PP←5 ⋄ ⍟⍣2 +2 3 4", "¯0.36651 0.094048 0.32663"),
    c("⎕PP←5 ⋄ 1+∘÷⍣=1", "1.618"),
    // Rank operator
    c("+\\⍤0 +2 3⍴1", "1 1 1\n1 1 1"),
    c("+\\⍤1 +2 3⍴1", "1 2 3\n1 2 3"),
    c("⍴⍤1 +2 3⍴1", "3\n3"),
    c("⍴⍤2 +2 3 5⍴1", "3 5\n3 5"),
    c(
        "4 5+⍤1 0 2 +2 2⍴7 8 9 10",
        "11 12\n13 14\n\n12 13\n14 15",
    ),
    c("⍉2 2 2⊤⍤1 0 ⍳5", "0 0 0 1 1\n0 1 1 0 0\n1 0 1 0 1"),
    c("⍳⍤1 +3 1⍴⍳3", "1 0 0\n1 2 0\n1 2 3"),
    // At
    c("(10 20@2 4)⍳5", "1 10 3 20 5"),
    c("10 20@2 4⍳5", "1 10 3 20 5"),
    c(
        "((2 3⍴10 20)@2 4)4 3⍴⍳12",
        "1 2 3\n10 20 10\n7 8 9\n20 10 20",
    ),
    c(
        "⍴@(0.5∘<)3 3⍴1 4 0.2 0.3 0.3 4",
        "5 5 0.2\n0.3 0.3 5\n5 5 0.2",
    ),
    c("÷@2 4 ⍳5", "1 0.5 3 0.25 5"),
    c("⌽@2 4 ⍳5", "1 4 3 2 5"),
    c("10×@2 4⍳5", "1 20 3 40 5"),
    c("(+\\@2 4)4 3⍴⍳12", "1 2 3\n4 9 15\n7 8 9\n10 21 33"),
    c("0@(2∘|)⍳5", "0 2 0 4 0"),
    c("⎕PP←5 ⋄ ÷@(2∘|)⍳5", "1 2 0.33333 4 0.2"),
    c("⌽@(2∘|)⍳5", "5 2 3 4 1"),
    // Stencil
    c("{⌈/⌈/⍵}⌺(3 3) ⊢3 3⍴⍳25", "5 6 6\n8 9 9\n8 9 9"),
    // Assignment, specification
    c("X←3", ""),
    c("-X←3", "¯3"),
    c("X←3⋄X←4", ""),
    c("X←3⋄⎕←X", "3"),
    c("f←+", ""),
    c("f←+⋄⎕←3 f 3", "6"),
    c("X←4⋄⎕←÷X", "0.25"),
    c("A←2 3 ⋄ A", "2 3"),
    // Indexed assignment
    c("A←2 3 4 ⋄ A[1]←1 ⋄ A", "1 3 4"),
    c("A←2 2⍴⍳4 ⋄ +A[1;1]←3 ⋄ A", "3\n3 2\n3 4"),
    c("A←⍳5 ⋄ A[2 3]←10 ⋄ A", "1 10 10 4 5"),
    c("A←2 3⍴⍳6 ⋄ A[;2 3]←2 2⍴⍳4 ⋄ A", "1 1 2\n4 3 4"),
    // Multiple assignment
    c("A←B←C←D←1 ⋄ A B C D", "1 1 1 1"),
    // Vector assignment
    c("(A B C)←2 3 4 ⋄ A ⋄ B ⋄ C ", "2\n3\n4"),
    c("-A B C←1 2 3 ⋄ A B C", "¯1 ¯2 ¯3\n1 2 3"),
    // Modified assignment
    c("A←1 ⋄ A+←1 ⋄ A", "2"),
    c("A←1 2⋄ A+←1 ⋄ A", "2 3"),
    c("A←1 2 ⋄ A+←3 4 ⋄ A", "4 6"),
    c("A←1 2 ⋄ A{⍺+⍵}←3 ⋄ A", "4 5"),
    c("A B C←1 2 3 ⋄ A B C +← 4 5 6 ⋄ A B C", "5 7 9"),
    // Selective assignment/specification
    c("A←10 20 30 40 ⋄ (2↑A)←100 200 ⋄ A", "100 200 30 40"),
    c("A←'ABCD' ⋄ (3↑A)←1 2 3 ⋄ A", "1 2 3 D"),
    c("A←1 2 3 ⋄ ((⍳0)↑A)←4 ⋄ A", "4 4 4"),
    c("A←2 3⍴⍳6 ⋄ (,A)←2×⍳6 ⋄ A", "2 4 6\n8 10 12"),
    c(
        "A←3 4⍴⍳12 ⋄ (4↑,⍉A)←10 20 30 40 ⋄ ,A ",
        "10 40 3 4 20 6 7 8 30 10 11 12",
    ),
    c("A←2 3⍴'ABCDEF' ⋄ A[1;1 3]←8 9 ⋄ A", "8 B 9\nD E F"),
    c("A←2 3 4 ⋄ A[]←9 ⋄ A", "9 9 9"),
    c("A←4 3⍴⍳12 ⋄ (1 0 0/A)←1 4⍴⍳4 ⋄ A[3;1]", "3"),
    c("A←3 2⍴⍳6 ⋄ (1 0/A)←'ABC' ⋄ A", "A 2\nB 4\nC 6"),
    c("A←4 5 6 ⋄ (1 ¯1  1/A)←7 8 9 ⋄ A", "7 5 9"),
    c("A←5 6 7 8 9 ⋄ (2↓A)←⍳3 ⋄ A", "5 6 1 2 3"),
    c(
        "A←3 4⍴'ABCDEFGHIJKL' ⋄ (1 ¯1↓A)←2 3⍴⍳6 ⋄ A",
        "A B C D\n1 2 3 H\n4 5 6 L",
    ),
    c("A←2 3⍴⍳6 ⋄ (1↓[1]A)←9 8 7 ⋄ A", "1 2 3\n9 8 7"),
    c(
        "A←2 3 4⍴⍳12⋄(¯1 2↓[3 2]A)←0⋄A",
        "1 2 3 4\n5 6 7 8\n0 0 0 12\n\n1 2 3 4\n5 6 7 8\n0 0 0 12",
    ),
    c("A←'ABC' ⋄ (1 0 1 0 1\\A)←⍳5 ⋄ A", "1 3 5"),
    c(
        "A←2 3⍴⍳6 ⋄ (1 0 1 1\\A)←10×2 4⍴⍳8 ⋄ A",
        "10 30 40\n50 70 80",
    ),
    c(
        "A←3 2⍴⍳6 ⋄ (1 1 0 0 1\\[1]A)←5 2⍴-⍳10 ⋄ A",
        "¯1 ¯2\n¯3 ¯4\n¯9 ¯10",
    ),
    c("A←2 3⍴⍳6 ⋄ (,A)←10×⍳6 ⋄ A", "10 20 30\n40 50 60"),
    c(
        "A←2 3 4⍴⍳24 ⋄ (,[2 3]A)←2 12⍴-⍳24⋄⍴A⋄A[2;3;]",
        "2 3 4\n¯21 ¯22 ¯23 ¯24",
    ),
    c(
        "A←'GROWTH' ⋄ (2 3⍴A)←2 3⍴-⍳6 ⋄ (4⍴A)←⍳4 ⋄ A",
        "1 2 3 4 ¯5 ¯6",
    ),
    c(
        "A←3 4⍴⍳12 ⋄ (⌽A)←3 4⍴'STOPSPINODER' ⋄ A",
        "P O T S\nN I P S\nR E D O",
    ),
    c("A←2 3⍴⍳6 ⋄ (⌽[1]A)←2 3⍴-⍳6 ⋄ A", "¯4 ¯5 ¯6\n¯1 ¯2 ¯3"),
    c("A←⍳6 ⋄ (2⌽A)←10×⍳6 ⋄ A", "50 60 10 20 30 40"),
    c(
        "A←3 4⍴⍳12 ⋄ (1 ¯1 2 ¯2⊖A)←3 4⍴4×⍳12 ⋄ A",
        "36 24 28 48\n4 40 44 16\n20 8 12 32",
    ),
    c("A←⍳5 ⋄ (2↑A)← 10 20 ⋄ A", "10 20 3 4 5"),
    c("A←2 3⍴⍳6 ⋄ (¯2↑[2]A)←2 2⍴10×⍳4 ⋄ A", "1 10 20\n4 30 40"),
    c("A←3 3⍴⍳9 ⋄ (1 1⍉A)←10 20 30 ⋄ A", "10 2 3\n4 20 6\n7 8 30"),
    c("A←3 3⍴'STYPIEANT' ⋄ (⍉A)←3 3⍴⍳9 ⋄ A", "1 4 7\n2 5 8\n3 6 9"),
    // IBM APL Language, 3rd edition, June 1976
    c(
        "⎕PP←5 ⋄ 1000×(1+.06÷1 4 12 365)*10×1 4 12 365",
        "1790.8 1814 1819.4 1822",
    ),
    c("Area ← 3×4\nX←2+⎕←3×Y←4\nX\nY", "12\n14\n4"),
    // Lambda expressions
    c("{2×⍵}3", "6"),
    c("2{⍺+3{⍺×⍵}⍵+2}2", "14"),
    c("2{(⍺+3){⍺×⍵}⍵+⍺{⍺+1+⍵}1+2}2", "40"),
    c("1{1+⍺{1+⍺{1+⍺+⍵}1+⍵}1+⍵}1", "7"),
    c("2{}4", ""),
    c("{⍺×⍵}/2 3 4", "24"),
    c("{1:1+2⋄{1:1+⍵}3}4", "3"),
    // Selective specification round trips leave the variable unchanged
    c("A←2 3⍴⍳6 ⋄ (⌽A)←⌽A ⋄ A", "1 2 3\n4 5 6"),
    c("A←10 20 30 40 ⋄ (2↑A)←2↑A ⋄ (1↓A)←1↓A ⋄ A", "10 20 30 40"),
    c("A←3 3⍴⍳9 ⋄ (⍉A)←⍉A ⋄ (,A)←,A ⋄ A", "1 2 3\n4 5 6\n7 8 9"),
    // Evaluation order
    c("A←1⋄A+(A←2)", "4"),
    c("A+A←3", "6"),
    c("A←1⋄A{(⍺ ⍵)}A+←10", "11 10"),
    // Lexical scoping
    c("A←1⋄{A←2⋄A}0⋄A", "2\n1"),
    c("X←{A←3⋄B←4⋄0:ignored⋄42}0⋄X⋄A⋄B", "42\nA\nB"),
    c("{A←1⋄{A←⍵}⍵+1}1", "2"),
    c("A←1⋄S←{A←2}0⋄A", "1"),
    c("A←1⋄S←{A⊢←2}0⋄A", "2"),
    c("A←1⍴1⋄S←{A[1]←2}0⋄A", "2"),
    c("A←1⋄{A+←1⋄A}0⋄A", "2\n2"),
    c("+X←{A←3⋄B←4}0", "4"),
    // Default left argument
    c("f←{⍺←3⋄⍺+⍵}⋄ f 4 ⋄ 1 f 4", "7\n5"),
    // Recursion
    c("f←{⍵≤1: 1 ⋄ ⍵×∇⍵-1} ⋄ f 6", "720"),
    c("f←{⍵≤1: 1 ⋄ ⍵×∇⍵-1} ⋄ f 10", "3628800"),
    c("S←0{⍺>20:⍺⋄⍵∇⎕←⍺+⍵}1", "1\n2\n3\n5\n8\n13\n21\n34"),
    // Tail call
    c("{⍵>1000:⍵⋄∇⍵+1}1", "1001"),
    // Trains, forks, atops
    c("-,÷ 5", "¯0.2"),
    c("(-,÷)5", "¯5 0.2"),
    c("3(+×-)1", "8"),
    c("(+⌿÷≢)3+⍳13", "10"),
    c("(⍳{⍺/⍵}⍳)3", "1 2 2 3 3 3"),
    c("(2/⍳)3", "1 1 2 2 3 3"),
    c("6(+,-,×,÷)2", "8 4 12 3"),
    c("6(⌽+,-,×,÷)2", "3 12 4 8"),
    c("⎕PP←5 ⋄ (*-)1", "0.36788"),
    c("⎕PP←5 ⋄ 2(*-)1", "2.7183"),
    c("⎕PP←5 ⋄ 1(*-)2", "0.36788"),
    c("3(÷+×-)1", "0.125"),
    c("(÷+×-)4", "¯0.0625"),
    c("(⌊÷+×-)4", "¯0.25"),
    c("6(⌊÷+×-)4", "0.2"),
    c("⎕PP←5 ⋄ (3+*)4", "57.598"),
    // Pi
    c("⎕PP←5 ⋄ .5*⍨6×+/÷2*⍨⍳1000", "3.1406"),
    c("⎕PP←5 ⋄ 4×-/÷¯1+2×⍳100", "3.1316"),
    c("⎕PP←5 ⋄ 4×+/{(⍵ ⍴ 1 0 ¯1 0)÷⍳⍵}100", "3.1216"),
    // Conway's game of life
    c(
        "A←5 5⍴(23⍴2)⊤1215488⋄l←{3=S-⍵∧4=S←({+/,⍵}⌺3 3)⍵}⋄(l⍣8)A",
        "0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 1\n0 0 1 0 1\n0 0 0 1 1",
    ),
];

/// Compare ignoring differences in whitespace, like the REPL tests
fn matches(got: &str, expect: &str) -> bool {
    let got = got.trim();
    let expect = expect.trim();
    let gl: Vec<&str> = got.lines().collect();
    let el: Vec<&str> = expect.lines().collect();
    if gl.len() != el.len() {
        return false;
    }
    gl.iter().zip(&el).all(|(g, e)| {
        let gf: Vec<&str> = g.split_whitespace().collect();
        let ef: Vec<&str> = e.split_whitespace().collect();
        gf == ef
    })
}

#[test]
fn end_to_end() {
    for case in CASES {
        let out = Buffer::new();
        let mut apl = Apl::new(out.clone());
        for line in case.input.split('\n') {
            if let Err(e) = apl.parse_and_eval(line) {
                panic!("{}: {e}", case.input);
            }
        }
        let got = out.take_string();
        assert!(
            matches(&got, case.expect),
            "in:\n{}\ngot:\n{}\nexpected:\n{}",
            case.input,
            got,
            case.expect
        );
    }
}

#[test]
fn errors_abort_the_remaining_statements() {
    let out = Buffer::new();
    let mut apl = Apl::new(out.clone());
    assert!(apl.parse_and_eval("X←1 ⋄ 1 2+1 2 3 ⋄ X←9").is_err());
    let x = apl.lookup("X").unwrap();
    assert_eq!(format!("{x}"), "1");
}

#[test]
fn domino_rejects_bad_matrices() {
    let out = Buffer::new();
    let mut apl = Apl::new(out.clone());
    assert!(apl.parse_and_eval("⌹2 3⍴⍳6").is_err());
    assert!(apl.parse_and_eval("⌹2 2⍴1 1 1 1").is_err());
    assert!(apl.parse_and_eval("1 2 3⌹2 2⍴2 0 0 1").is_err());
}

/// A record-like host object with one field and one method
#[derive(Debug)]
struct Counter {
    i: RefCell<i64>,
}

impl PackageValue for Counter {
    fn name(&self) -> &str {
        "counter"
    }
    fn keys(&self) -> Option<Vec<EcoString>> {
        Some(vec!["I".into()])
    }
    fn at(&self, key: &str) -> Option<Value> {
        match key {
            "I" => Some(Value::int(*self.i.borrow())),
            "Inc" => {
                *self.i.borrow_mut() += 1;
                Some(Value::int(*self.i.borrow()))
            }
            _ => None,
        }
    }
    fn set(&self, key: &str, v: Value) -> AplResult<()> {
        if key != "I" {
            return Err(AplError::domain(format!("counter: cannot set field {key}")));
        }
        let n = v
            .as_index()
            .ok_or_else(|| AplError::domain("counter: integer expected"))?;
        *self.i.borrow_mut() = n;
        Ok(())
    }
    fn methods(&self) -> Vec<EcoString> {
        vec!["inc".into()]
    }
}

/// A callable host value
#[derive(Debug)]
struct Twice;

impl PackageValue for Twice {
    fn name(&self) -> &str {
        "twice"
    }
    fn call(&self, _apl: &mut Apl, _l: Option<Value>, r: Value) -> AplResult<Value> {
        let n = r
            .as_index()
            .ok_or_else(|| AplError::domain("twice: integer expected"))?;
        Ok(Value::int(2 * n))
    }
}

#[test]
fn host_objects_expose_fields_and_methods() {
    let out = Buffer::new();
    let mut apl = Apl::new(out.clone());
    apl.register_host("t", "obj", Rc::new(Counter { i: RefCell::new(55) }));
    apl.register_host("t", "twice", Rc::new(Twice));
    // Field read folds the first rune of the key
    apl.parse_and_eval("X←t→obj ⋄ X[\"i\"]").unwrap();
    assert_eq!(out.take_string(), "55\n");
    // Field write goes through the object's set method
    apl.parse_and_eval("X[\"I\"]←7 ⋄ X[\"i\"]").unwrap();
    assert_eq!(out.take_string(), "7\n");
    // Method access folds too
    apl.parse_and_eval("X[\"inc\"] ⋄ X[\"i\"]").unwrap();
    assert_eq!(out.take_string(), "8\n8\n");
    // Unknown fields fail, and non-string keys are rejected
    assert!(apl.parse_and_eval("X[\"nope\"]").is_err());
    assert!(apl.parse_and_eval("X[3]").is_err());
    // Callable host values apply like functions
    apl.parse_and_eval("Y←t→twice 21 ⋄ Y").unwrap();
    assert_eq!(out.take_string(), "42\n");
    // vars on a qualified name lists fields and methods
    assert_eq!(apl.vars("t→obj").unwrap(), ["I", "inc"]);
    assert!(apl.vars("t→missing").is_err());
}

#[test]
fn deal_yields_distinct_indices_in_range() {
    let out = Buffer::new();
    let mut apl = Apl::new(out.clone());
    apl.parse_and_eval("X←5?5 ⋄ Y←+/X").unwrap();
    let y = apl.lookup("Y").unwrap();
    assert_eq!(format!("{y}"), "15");
}

#[test]
fn roll_respects_the_index_origin() {
    let out = Buffer::new();
    let mut apl = Apl::new(out.clone());
    apl.parse_and_eval("⎕IO←0 ⋄ X←?10⍴1").unwrap();
    let x = apl.lookup("X").unwrap();
    assert_eq!(format!("{x}"), "0 0 0 0 0 0 0 0 0 0");
}
